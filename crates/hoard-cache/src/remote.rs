//! Remote cache backends.

use async_trait::async_trait;
use hoard_core::ports::RemoteCache;
use hoard_core::{RestoreOptions, SAVE_FAILED, SaveOptions};
use tracing::warn;

/// Remote backend for hosts without a remote cache service.
///
/// Every restore is a miss and every save fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRemote;

#[async_trait]
impl RemoteCache for UnconfiguredRemote {
    async fn restore(
        &self,
        _paths: &[String],
        primary_key: &str,
        _restore_keys: &[String],
        _options: RestoreOptions,
        _cross_os_archive: bool,
    ) -> Option<String> {
        warn!(key = %primary_key, "No cache directory and no remote cache configured");
        None
    }

    async fn save(
        &self,
        _paths: &[String],
        key: &str,
        _options: Option<&mut SaveOptions>,
        _cross_os_archive: bool,
    ) -> i64 {
        warn!(key = %key, "No cache directory and no remote cache configured");
        SAVE_FAILED
    }
}
