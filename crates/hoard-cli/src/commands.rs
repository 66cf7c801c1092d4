//! CLI command definitions.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Restore cached paths
    Restore {
        /// Primary cache key
        #[arg(short, long)]
        key: String,

        /// Fallback keys, tried in order after the primary key
        #[arg(short, long = "restore-key")]
        restore_keys: Vec<String>,

        /// Report a hit without extracting the archive
        #[arg(long)]
        lookup_only: bool,

        #[command(flatten)]
        target: CacheTarget,
    },

    /// Save paths to the cache
    Save {
        /// Cache key
        #[arg(short, long)]
        key: String,

        /// Upload chunk size for the remote cache, in bytes
        #[arg(long)]
        upload_chunk_size: Option<usize>,

        #[command(flatten)]
        target: CacheTarget,
    },

    /// List archives in the cache directory
    List {
        /// Cache directory
        #[arg(long, env = "HOARD_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Arguments shared by restore and save.
#[derive(Args)]
pub struct CacheTarget {
    /// Paths or glob patterns to cache (prefix with `!` to exclude)
    #[arg(short, long = "path", required = true)]
    pub paths: Vec<String>,

    /// Local cache directory; the remote cache is used when unset
    #[arg(long, env = "HOARD_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Allow archives to be restored on a different OS
    #[arg(long)]
    pub cross_os: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
