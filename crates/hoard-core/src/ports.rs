//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the cache core and the
//! external capabilities it drives: the remote cache service, the archive
//! codec and the privileged ownership change.

use crate::Result;
use crate::cache::{CompressionMethod, RestoreOptions, SaveOptions};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Remote cache service used when no local cache directory is configured.
///
/// Both operations are best-effort: failures are reported as a miss or as
/// [`crate::cache::SAVE_FAILED`], never as an error.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Restore the first matching entry and return its key.
    async fn restore(
        &self,
        paths: &[String],
        primary_key: &str,
        restore_keys: &[String],
        options: RestoreOptions,
        cross_os_archive: bool,
    ) -> Option<String>;

    /// Save the paths under `key` and return the cache id.
    async fn save(
        &self,
        paths: &[String],
        key: &str,
        options: Option<&mut SaveOptions>,
        cross_os_archive: bool,
    ) -> i64;
}

/// Tar codec over a compression method.
#[async_trait]
pub trait ArchiveCodec: Send + Sync {
    /// Write an archive of `paths` (relative to `working_dir`) to `archive_path`.
    async fn create(
        &self,
        archive_path: &Path,
        working_dir: &Path,
        paths: &[PathBuf],
        method: CompressionMethod,
    ) -> Result<()>;

    /// Extract the archive at `archive_path` into `dest`.
    async fn extract(&self, archive_path: &Path, dest: &Path, method: CompressionMethod)
    -> Result<()>;

    /// List the entry paths of an archive without modifying it.
    async fn list(&self, archive_path: &Path, method: CompressionMethod) -> Result<Vec<String>>;
}

/// Makes a directory tree owned by the current process identity.
#[async_trait]
pub trait OwnershipNormalizer: Send + Sync {
    /// Recursively take ownership of `directory`.
    async fn ensure_ownership(&self, directory: &Path) -> Result<()>;
}
