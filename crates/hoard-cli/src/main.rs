//! hoard CLI entrypoint.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

use commands::{Commands, ConfigCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "hoard")]
#[command(author, version, about = "Key-addressed archive cache", long_about = None)]
struct Cli {
    /// Log at debug level, including archive contents
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load().unwrap_or_default();

    match cli.command {
        Commands::Restore {
            key,
            restore_keys,
            lookup_only,
            target,
        } => handlers::restore(&config, &key, &restore_keys, lookup_only, &target).await?,
        Commands::Save {
            key,
            upload_chunk_size,
            target,
        } => handlers::save(&config, &key, upload_chunk_size, &target).await?,
        Commands::List { cache_dir, json } => handlers::list_cache(&config, cache_dir, json).await?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
