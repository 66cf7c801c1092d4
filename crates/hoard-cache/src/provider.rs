//! Local-disk cache backend.
//!
//! Archives live directly in the cache directory as
//! `{sanitized key}-{version}.{tar.zst|tar.gz}`; the presence of that file is
//! the whole index. Restore scans the candidate keys in order and extracts
//! the first archive found. Save builds the archive in a private temporary
//! directory and copies it into place.

use crate::archiver::TarCodec;
use crate::compression::{detect_method, resolve_compression_method};
use crate::keys::{cache_file_name, compute_version};
use crate::paths::resolve_paths;
use crate::permissions::ChownCommand;
use crate::validation::{candidate_keys, validate_key, validate_paths};
use hoard_core::ports::{ArchiveCodec, OwnershipNormalizer};
use hoard_core::{
    ArchiveEntry, CompressionMethod, Error, RestoreOptions, Result, SAVE_FAILED, SaveOptions,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::AsyncReadExt;
use tracing::{Level, debug, info, warn};

static NEXT_SAVE_ID: AtomicI64 = AtomicI64::new(1);

/// Settings for the local backend.
#[derive(Debug, Clone, Default)]
pub struct LocalCacheConfig {
    /// Directory paths are resolved against and archives are extracted into.
    /// Defaults to the process current directory.
    pub working_dir: Option<PathBuf>,
    /// Parent of the per-save temporary directories. Defaults to the system
    /// temp dir.
    pub temp_root: Option<PathBuf>,
}

/// Cache backend storing archives in a local directory.
pub struct LocalDiskCache {
    config: LocalCacheConfig,
    codec: Arc<dyn ArchiveCodec>,
    ownership: Arc<dyn OwnershipNormalizer>,
}

impl LocalDiskCache {
    pub fn new(
        config: LocalCacheConfig,
        codec: Arc<dyn ArchiveCodec>,
        ownership: Arc<dyn OwnershipNormalizer>,
    ) -> Self {
        Self {
            config,
            codec,
            ownership,
        }
    }

    fn working_dir(&self) -> Result<PathBuf> {
        match &self.config.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Restore the first archive matching the candidate keys.
    ///
    /// Never fails: errors are logged and reported as a miss.
    pub async fn restore(
        &self,
        paths: &[String],
        primary_key: &str,
        restore_keys: &[String],
        options: RestoreOptions,
        cross_os_archive: bool,
        cache_dir: &Path,
    ) -> Option<String> {
        match self
            .try_restore(
                paths,
                primary_key,
                restore_keys,
                options,
                cross_os_archive,
                cache_dir,
            )
            .await
        {
            Ok(matched) => matched,
            Err(e) => {
                warn!(key = %primary_key, error = %e, "Failed to restore cache");
                None
            }
        }
    }

    /// Restore with the failure cause preserved.
    pub async fn try_restore(
        &self,
        paths: &[String],
        primary_key: &str,
        restore_keys: &[String],
        options: RestoreOptions,
        cross_os_archive: bool,
        cache_dir: &Path,
    ) -> Result<Option<String>> {
        self.ownership.ensure_ownership(cache_dir).await?;

        validate_paths(Some(paths))?;
        let keys = candidate_keys(primary_key, restore_keys)?;

        let method = resolve_compression_method()?;
        let version = compute_version(paths, method, cross_os_archive);

        tokio::fs::create_dir_all(cache_dir).await?;

        for key in keys {
            let archive_path = cache_dir.join(cache_file_name(&key, &version, method));
            if !tokio::fs::try_exists(&archive_path).await? {
                debug!(key = %key, path = %archive_path.display(), "No archive for key");
                continue;
            }

            if options.lookup_only {
                info!(key = %key, "Cache hit (lookup only)");
                return Ok(Some(key));
            }

            let working_dir = self.working_dir()?;
            self.codec
                .extract(&archive_path, &working_dir, method)
                .await?;

            info!(
                key = %key,
                exact_match = key == primary_key,
                path = %archive_path.display(),
                "Cache restored"
            );
            return Ok(Some(key));
        }

        info!(key = %primary_key, "Cache miss");
        Ok(None)
    }

    /// Save `paths` under `key`.
    ///
    /// Returns a save id, or [`SAVE_FAILED`] after logging the cause.
    pub async fn save(
        &self,
        paths: &[String],
        key: &str,
        options: Option<&mut SaveOptions>,
        cross_os_archive: bool,
        cache_dir: &Path,
    ) -> i64 {
        match self
            .try_save(paths, key, options, cross_os_archive, cache_dir)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to save cache");
                SAVE_FAILED
            }
        }
    }

    /// Save with the failure cause preserved.
    pub async fn try_save(
        &self,
        paths: &[String],
        key: &str,
        options: Option<&mut SaveOptions>,
        cross_os_archive: bool,
        cache_dir: &Path,
    ) -> Result<i64> {
        self.ownership.ensure_ownership(cache_dir).await?;

        validate_paths(Some(paths))?;
        validate_key(key)?;

        let method = resolve_compression_method()?;
        let working_dir = self.working_dir()?;
        let cache_paths = resolve_paths(paths, &working_dir)?;
        if cache_paths.is_empty() {
            return Err(Error::PathValidation(
                "Path Validation Error: Path(s) specified in the action for caching do(es) not exist, hence no cache is being saved.".into(),
            ));
        }

        let version = compute_version(paths, method, cross_os_archive);

        tokio::fs::create_dir_all(cache_dir).await?;

        let temp = TempArchive::create(self.config.temp_root.as_deref(), method)?;
        let destination = cache_dir.join(cache_file_name(key, &version, method));
        let result = self
            .build_and_commit(&temp, &working_dir, &cache_paths, method, options, &destination)
            .await;
        temp.close();

        let size = result?;
        let id = NEXT_SAVE_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            key = %key,
            size_bytes = size,
            path = %destination.display(),
            "Cache saved"
        );
        Ok(id)
    }

    async fn build_and_commit(
        &self,
        temp: &TempArchive,
        working_dir: &Path,
        cache_paths: &[PathBuf],
        method: CompressionMethod,
        options: Option<&mut SaveOptions>,
        destination: &Path,
    ) -> Result<u64> {
        self.codec
            .create(&temp.path, working_dir, cache_paths, method)
            .await?;

        if tracing::enabled!(Level::DEBUG) {
            match self.codec.list(&temp.path, method).await {
                Ok(names) => {
                    for entry in names {
                        debug!(entry = %entry, "Archived");
                    }
                }
                Err(e) => debug!(error = %e, "Failed to list archive"),
            }
        }

        let size = tokio::fs::metadata(&temp.path).await?.len();
        debug!(
            size_mb = size as f64 / (1024.0 * 1024.0),
            "Archive built"
        );
        if let Some(options) = options {
            options.archive_size_bytes = Some(size);
        }

        tokio::fs::copy(&temp.path, destination).await?;
        Ok(size)
    }

    /// List the archives stored in `cache_dir`.
    pub async fn list_entries(&self, cache_dir: &Path) -> Result<Vec<ArchiveEntry>> {
        if !tokio::fs::try_exists(cache_dir).await? {
            return Ok(vec![]);
        }

        let mut entries = vec![];
        let mut read_dir = tokio::fs::read_dir(cache_dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".tar.zst") && !name.ends_with(".tar.gz") {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let compression = detect_method(&read_magic(&entry.path()).await?, &name);
            entries.push(ArchiveEntry {
                file_name: name,
                size_bytes: metadata.len(),
                compression,
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}

/// Leading bytes of a file, fewer when the file is shorter.
async fn read_magic(path: &Path) -> Result<Vec<u8>> {
    let mut magic = Vec::with_capacity(4);
    tokio::fs::File::open(path)
        .await?
        .take(4)
        .read_to_end(&mut magic)
        .await?;
    Ok(magic)
}

impl Default for LocalDiskCache {
    fn default() -> Self {
        Self::new(
            LocalCacheConfig::default(),
            Arc::new(TarCodec::new()),
            Arc::new(ChownCommand::sudo()),
        )
    }
}

/// Archive file inside a temporary directory owned by one save call.
struct TempArchive {
    dir: tempfile::TempDir,
    path: PathBuf,
}

impl TempArchive {
    fn create(root: Option<&Path>, method: CompressionMethod) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("hoard-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let path = dir.path().join(format!("cache.{}", method.extension()));
        Ok(Self { dir, path })
    }

    /// Remove the directory and archive; failures are only logged.
    fn close(self) {
        let dir = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            debug!(path = %dir.display(), error = %e, "Failed to remove temporary archive");
        }
    }
}
