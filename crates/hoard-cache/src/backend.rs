//! Per-call choice between the remote cache and a local cache directory.

use crate::provider::LocalDiskCache;
use crate::remote::UnconfiguredRemote;
use hoard_core::ports::RemoteCache;
use hoard_core::{RestoreOptions, SaveOptions};
use std::path::Path;
use std::sync::Arc;

/// Entry point for restore and save.
///
/// Calls with a non-empty cache directory go to the local backend; all
/// others are handed to the remote backend untouched.
pub struct CacheClient {
    remote: Arc<dyn RemoteCache>,
    local: LocalDiskCache,
}

impl CacheClient {
    pub fn new(remote: Arc<dyn RemoteCache>, local: LocalDiskCache) -> Self {
        Self { remote, local }
    }

    /// The local backend, for listing and typed error access.
    pub fn local(&self) -> &LocalDiskCache {
        &self.local
    }

    /// Restore a cache entry, returning the matched key or `None` on a miss
    /// or any failure.
    pub async fn restore_cache(
        &self,
        paths: &[String],
        primary_key: &str,
        restore_keys: &[String],
        options: Option<RestoreOptions>,
        cross_os_archive: bool,
        cache_dir: Option<&Path>,
    ) -> Option<String> {
        let options = options.unwrap_or_default();
        match local_dir(cache_dir) {
            Some(dir) => {
                self.local
                    .restore(paths, primary_key, restore_keys, options, cross_os_archive, dir)
                    .await
            }
            None => {
                self.remote
                    .restore(paths, primary_key, restore_keys, options, cross_os_archive)
                    .await
            }
        }
    }

    /// Save a cache entry, returning its id or [`hoard_core::SAVE_FAILED`].
    pub async fn save_cache(
        &self,
        paths: &[String],
        key: &str,
        options: Option<&mut SaveOptions>,
        cross_os_archive: bool,
        cache_dir: Option<&Path>,
    ) -> i64 {
        match local_dir(cache_dir) {
            Some(dir) => {
                self.local
                    .save(paths, key, options, cross_os_archive, dir)
                    .await
            }
            None => self.remote.save(paths, key, options, cross_os_archive).await,
        }
    }
}

impl Default for CacheClient {
    fn default() -> Self {
        Self::new(Arc::new(UnconfiguredRemote), LocalDiskCache::default())
    }
}

fn local_dir(cache_dir: Option<&Path>) -> Option<&Path> {
    cache_dir.filter(|dir| !dir.as_os_str().is_empty())
}
