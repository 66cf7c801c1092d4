//! Serialization roundtrip tests for hoard-core types.

use hoard_core::*;
use pretty_assertions::assert_eq;

#[test]
fn test_compression_method_wire_names() {
    let json = serde_json::to_string(&CompressionMethod::ZstdWithoutLong).expect("serialize");
    assert_eq!(json, "\"zstd-without-long\"");

    let parsed: CompressionMethod = serde_json::from_str("\"gzip\"").expect("deserialize");
    assert_eq!(parsed, CompressionMethod::Gzip);
}

#[test]
fn test_compression_method_display_matches_serde() {
    for method in [
        CompressionMethod::Gzip,
        CompressionMethod::ZstdWithoutLong,
        CompressionMethod::Zstd,
    ] {
        let json = serde_json::to_string(&method).expect("serialize");
        assert_eq!(json, format!("\"{}\"", method));
    }
}

#[test]
fn test_restore_options_default_when_missing() {
    let parsed: RestoreOptions = serde_json::from_str("{}").expect("deserialize");
    assert!(!parsed.lookup_only);
}

#[test]
fn test_save_options_roundtrip() {
    let options = SaveOptions {
        upload_chunk_size: Some(32 * 1024 * 1024),
        archive_size_bytes: Some(1234),
    };

    let json = serde_json::to_string(&options).expect("serialize");
    let parsed: SaveOptions = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(options, parsed);
}

#[test]
fn test_archive_entry_roundtrip() {
    let entry = ArchiveEntry {
        file_name: "npm-linux-abc.tar.zst".to_string(),
        size_bytes: 42,
        compression: Some(CompressionMethod::Zstd),
    };

    let json = serde_json::to_string(&entry).expect("serialize");
    let parsed: ArchiveEntry = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(entry, parsed);
}
