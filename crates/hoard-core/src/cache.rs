//! Cache types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a cache key, in characters.
pub const MAX_KEY_LENGTH: usize = 512;

/// Maximum number of candidate keys (primary plus restore keys) per restore.
pub const MAX_CANDIDATE_KEYS: usize = 10;

/// Returned by save when the archive could not be stored.
pub const SAVE_FAILED: i64 = -1;

/// Compression applied to the tar stream of an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionMethod {
    Gzip,
    /// Zstandard without long-distance matching.
    ZstdWithoutLong,
    #[default]
    Zstd,
}

impl CompressionMethod {
    /// Identifier used in version derivation and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionMethod::Gzip => "gzip",
            CompressionMethod::ZstdWithoutLong => "zstd-without-long",
            CompressionMethod::Zstd => "zstd",
        }
    }

    /// Archive file extension. Only `zstd` maps to `tar.zst`.
    pub fn extension(&self) -> &'static str {
        match self {
            CompressionMethod::Zstd => "tar.zst",
            _ => "tar.gz",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" => Ok(CompressionMethod::Gzip),
            "zstd-without-long" => Ok(CompressionMethod::ZstdWithoutLong),
            "zstd" => Ok(CompressionMethod::Zstd),
            other => Err(crate::Error::Config(format!(
                "Unknown compression method: {}",
                other
            ))),
        }
    }
}

/// Options for a restore call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOptions {
    /// Report a match without extracting it.
    #[serde(default)]
    pub lookup_only: bool,
}

/// Options for a save call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Chunk size used by the remote backend for uploads.
    pub upload_chunk_size: Option<usize>,
    /// Size of the archive built by the last save, filled in by the save call.
    pub archive_size_bytes: Option<u64>,
}

/// An archive file found in a local cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// File name inside the cache directory.
    pub file_name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Compression detected from the stream header; `None` when the file is
    /// not a recognizable archive.
    pub compression: Option<CompressionMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_only_zstd_is_zst() {
        assert_eq!(CompressionMethod::Zstd.extension(), "tar.zst");
        assert_eq!(CompressionMethod::Gzip.extension(), "tar.gz");
        assert_eq!(CompressionMethod::ZstdWithoutLong.extension(), "tar.gz");
    }

    #[test]
    fn test_parse_compression_method() {
        assert_eq!(
            "zstd".parse::<CompressionMethod>().unwrap(),
            CompressionMethod::Zstd
        );
        assert_eq!(
            " GZIP ".parse::<CompressionMethod>().unwrap(),
            CompressionMethod::Gzip
        );
        assert_eq!(
            "zstd-without-long".parse::<CompressionMethod>().unwrap(),
            CompressionMethod::ZstdWithoutLong
        );
        assert!("lz4".parse::<CompressionMethod>().is_err());
    }
}
