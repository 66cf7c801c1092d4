//! Cache key and archive filename utilities.

use hoard_core::CompressionMethod;
use sha2::{Digest, Sha256};

/// Salt mixed into every version so a format change can invalidate all archives.
const VERSION_SALT: &str = "1.0";

/// Sanitize a key for use in filenames.
///
/// Every character outside `[A-Za-z0-9-_]` becomes `_`, so distinct keys may
/// share a filename.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Archive filename for a key, version and compression method.
pub fn cache_file_name(key: &str, version: &str, method: CompressionMethod) -> String {
    format!("{}-{}.{}", sanitize_key(key), version, method.extension())
}

/// Derive the cache version from the requested paths and archive settings.
pub fn compute_version(
    paths: &[String],
    method: CompressionMethod,
    cross_os_archive: bool,
) -> String {
    let mut components: Vec<&str> = paths.iter().map(String::as_str).collect();
    components.push(method.as_str());

    // Windows archives use a different path layout unless explicitly portable.
    if cfg!(windows) && !cross_os_archive {
        components.push("windows-only");
    }

    components.push(VERSION_SALT);

    let mut hasher = Sha256::new();
    hasher.update(components.join("|").as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("my/cache/key"), "my_cache_key");
        assert_eq!(sanitize_key("cache:key"), "cache_key");
        assert_eq!(sanitize_key("Linux-npm_v2"), "Linux-npm_v2");
        assert_eq!(sanitize_key("a.b c+d"), "a_b_c_d");
        assert_eq!(sanitize_key("ключ"), "____");
    }

    #[test]
    fn test_cache_file_name_extension() {
        assert_eq!(
            cache_file_name("npm/lock", "abc", CompressionMethod::Zstd),
            "npm_lock-abc.tar.zst"
        );
        assert_eq!(
            cache_file_name("npm/lock", "abc", CompressionMethod::Gzip),
            "npm_lock-abc.tar.gz"
        );
    }

    #[test]
    fn test_version_is_not_sanitized() {
        let name = cache_file_name("k", "v.1", CompressionMethod::Gzip);
        assert_eq!(name, "k-v.1.tar.gz");
    }

    #[test]
    fn test_colliding_keys_share_a_filename() {
        let a = cache_file_name("deps/linux", "v", CompressionMethod::Zstd);
        let b = cache_file_name("deps:linux", "v", CompressionMethod::Zstd);
        assert_eq!(a, b);
    }

    #[test]
    fn test_compute_version_is_deterministic() {
        let paths = vec!["node_modules".to_string(), "~/.npm".to_string()];
        let a = compute_version(&paths, CompressionMethod::Zstd, false);
        let b = compute_version(&paths, CompressionMethod::Zstd, false);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_compute_version_depends_on_inputs() {
        let paths = vec!["target".to_string()];
        let zstd = compute_version(&paths, CompressionMethod::Zstd, false);
        let gzip = compute_version(&paths, CompressionMethod::Gzip, false);
        let other = compute_version(&["dist".to_string()], CompressionMethod::Zstd, false);
        assert_ne!(zstd, gzip);
        assert_ne!(zstd, other);
    }

    #[test]
    fn test_compute_version_path_order_matters() {
        let ab = compute_version(
            &["a".to_string(), "b".to_string()],
            CompressionMethod::Zstd,
            false,
        );
        let ba = compute_version(
            &["b".to_string(), "a".to_string()],
            CompressionMethod::Zstd,
            false,
        );
        assert_ne!(ab, ba);
    }
}
