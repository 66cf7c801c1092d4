//! Command handlers.

use crate::commands::CacheTarget;
use crate::config::{CliConfig, OwnershipMode};
use console::style;
use hoard_cache::{
    CacheClient, ChownCommand, LocalCacheConfig, LocalDiskCache, SkipOwnership, TarCodec,
    UnconfiguredRemote,
};
use hoard_core::ports::OwnershipNormalizer;
use hoard_core::{RestoreOptions, SAVE_FAILED, SaveOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Build the cache client for the configured ownership mode.
pub fn build_client(config: &CliConfig) -> CacheClient {
    let ownership: Arc<dyn OwnershipNormalizer> = match config.ownership {
        OwnershipMode::Sudo => Arc::new(ChownCommand::sudo()),
        OwnershipMode::Skip => Arc::new(SkipOwnership),
    };
    debug!(ownership = ?config.ownership, "Building cache client");
    let local = LocalDiskCache::new(
        LocalCacheConfig::default(),
        Arc::new(TarCodec::new()),
        ownership,
    );
    CacheClient::new(Arc::new(UnconfiguredRemote), local)
}

fn cache_dir<'a>(flag: &'a Option<PathBuf>, config: &'a CliConfig) -> Option<&'a Path> {
    flag.as_deref().or(config.cache_dir.as_deref())
}

/// Restore cached paths.
pub async fn restore(
    config: &CliConfig,
    key: &str,
    restore_keys: &[String],
    lookup_only: bool,
    target: &CacheTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(config);
    let matched = client
        .restore_cache(
            &target.paths,
            key,
            restore_keys,
            Some(RestoreOptions { lookup_only }),
            target.cross_os || config.cross_os_archive,
            cache_dir(&target.cache_dir, config),
        )
        .await;

    match matched {
        Some(matched_key) => {
            println!(
                "{} Cache hit for {}",
                style("✓").green(),
                style(&matched_key).bold()
            );
            println!("cache-hit={}", matched_key == key);
            println!("cache-matched-key={}", matched_key);
        }
        None => {
            println!("{} Cache not found for {}", style("i").blue(), key);
            println!("cache-hit=false");
        }
    }
    Ok(())
}

/// Save paths to the cache.
pub async fn save(
    config: &CliConfig,
    key: &str,
    upload_chunk_size: Option<usize>,
    target: &CacheTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(config);
    let mut options = SaveOptions {
        upload_chunk_size,
        archive_size_bytes: None,
    };
    let id = client
        .save_cache(
            &target.paths,
            key,
            Some(&mut options),
            target.cross_os || config.cross_os_archive,
            cache_dir(&target.cache_dir, config),
        )
        .await;

    if id == SAVE_FAILED {
        println!("{} Cache not saved for {}", style("!").yellow(), key);
        return Ok(());
    }

    println!("{} Cache saved with key {}", style("✓").green(), style(key).bold());
    if let Some(size) = options.archive_size_bytes {
        println!(
            "  Archive size: {:.2} MB ({} B)",
            size as f64 / (1024.0 * 1024.0),
            size
        );
    }
    Ok(())
}

/// List archives in the cache directory.
pub async fn list_cache(
    config: &CliConfig,
    flag: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = cache_dir(&flag, config).ok_or("No cache directory configured")?;
    let entries = build_client(config).local().list_entries(dir).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{} No cache entries in {}", style("i").blue(), dir.display());
        return Ok(());
    }
    for entry in &entries {
        println!(
            "  {:>12}  {:<17}  {}",
            entry.size_bytes,
            entry
                .compression
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            entry.file_name
        );
    }
    Ok(())
}

/// Show configuration.
pub fn show_config(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current configuration:");
    println!(
        "  cache_dir: {}",
        config
            .cache_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  cross_os_archive: {}", config.cross_os_archive);
    println!("  ownership: {:?}", config.ownership);

    if let Ok(path) = CliConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }

    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::load().unwrap_or_default();
    config.set(key, value)?;
    config.save()?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
