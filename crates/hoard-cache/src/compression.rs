//! Compression method selection and stream wrappers for archives.

use hoard_core::{CompressionMethod, Error, Result};
use std::io::{Read, Write};

/// Environment variable overriding the compression method.
pub const COMPRESSION_ENV: &str = "HOARD_COMPRESSION";

const ZSTD_LEVEL: i32 = 3;
const ZSTD_LONG_WINDOW_LOG: u32 = 30;
const ZSTD_MAX_WINDOW_LOG: u32 = 31;

/// Resolve the compression method for this process.
pub fn resolve_compression_method() -> Result<CompressionMethod> {
    method_from_setting(std::env::var(COMPRESSION_ENV).ok().as_deref())
}

fn method_from_setting(value: Option<&str>) -> Result<CompressionMethod> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse(),
        _ => Ok(CompressionMethod::default()),
    }
}

/// Compressing writer for the tar stream.
pub enum ArchiveWriter<W: Write> {
    Gzip(flate2::write::GzEncoder<W>),
    Zstd(zstd::stream::write::Encoder<'static, W>),
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(writer: W, method: CompressionMethod) -> Result<Self> {
        match method {
            CompressionMethod::Gzip => Ok(ArchiveWriter::Gzip(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            ))),
            CompressionMethod::ZstdWithoutLong => zstd::stream::write::Encoder::new(writer, ZSTD_LEVEL)
                .map(ArchiveWriter::Zstd)
                .map_err(|e| Error::Codec(format!("Zstd init failed: {}", e))),
            CompressionMethod::Zstd => {
                let mut encoder = zstd::stream::write::Encoder::new(writer, ZSTD_LEVEL)
                    .map_err(|e| Error::Codec(format!("Zstd init failed: {}", e)))?;
                encoder
                    .long_distance_matching(true)
                    .and_then(|_| encoder.window_log(ZSTD_LONG_WINDOW_LOG))
                    .map_err(|e| Error::Codec(format!("Zstd long mode failed: {}", e)))?;
                Ok(ArchiveWriter::Zstd(encoder))
            }
        }
    }

    /// Flush the compressed trailer and return the inner writer.
    pub fn finish(self) -> Result<W> {
        match self {
            ArchiveWriter::Gzip(encoder) => encoder
                .finish()
                .map_err(|e| Error::Codec(format!("Gzip finish failed: {}", e))),
            ArchiveWriter::Zstd(encoder) => encoder
                .finish()
                .map_err(|e| Error::Codec(format!("Zstd finish failed: {}", e))),
        }
    }
}

impl<W: Write> Write for ArchiveWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            ArchiveWriter::Gzip(encoder) => encoder.write(buf),
            ArchiveWriter::Zstd(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            ArchiveWriter::Gzip(encoder) => encoder.flush(),
            ArchiveWriter::Zstd(encoder) => encoder.flush(),
        }
    }
}

/// Decompressing reader for the tar stream.
pub fn archive_reader<'a, R: Read + 'a>(
    reader: R,
    method: CompressionMethod,
) -> Result<Box<dyn Read + 'a>> {
    match method {
        CompressionMethod::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
        CompressionMethod::Zstd | CompressionMethod::ZstdWithoutLong => {
            let mut decoder = zstd::stream::read::Decoder::new(reader)
                .map_err(|e| Error::Codec(format!("Failed to create decoder: {}", e)))?;
            decoder
                .window_log_max(ZSTD_MAX_WINDOW_LOG)
                .map_err(|e| Error::Codec(format!("Failed to configure decoder: {}", e)))?;
            Ok(Box::new(decoder))
        }
    }
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Identify the method an archive was written with from its leading bytes.
///
/// A zstd stream in a `.tar.zst` file came from the long-window method; one
/// in a `.tar.gz` file came from `zstd-without-long`.
pub fn detect_method(magic: &[u8], file_name: &str) -> Option<CompressionMethod> {
    if magic.starts_with(&GZIP_MAGIC) {
        Some(CompressionMethod::Gzip)
    } else if magic.starts_with(&ZSTD_MAGIC) {
        if file_name.ends_with(CompressionMethod::Zstd.extension()) {
            Some(CompressionMethod::Zstd)
        } else {
            Some(CompressionMethod::ZstdWithoutLong)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(method: CompressionMethod) {
        let data = b"Hello, World! This is a test of compression.".repeat(64);

        let mut writer = ArchiveWriter::new(Vec::new(), method).unwrap();
        writer.write_all(&data).unwrap();
        let compressed = writer.finish().unwrap();
        assert!(compressed.len() < data.len());

        let mut output = Vec::new();
        archive_reader(compressed.as_slice(), method)
            .unwrap()
            .read_to_end(&mut output)
            .unwrap();
        assert_eq!(data, output);
    }

    #[test]
    fn test_zstd_long_roundtrip() {
        roundtrip(CompressionMethod::Zstd);
    }

    #[test]
    fn test_zstd_without_long_roundtrip() {
        roundtrip(CompressionMethod::ZstdWithoutLong);
    }

    #[test]
    fn test_gzip_roundtrip() {
        roundtrip(CompressionMethod::Gzip);
    }

    #[test]
    fn test_detect_method_from_stream_header() {
        for method in [
            CompressionMethod::Gzip,
            CompressionMethod::ZstdWithoutLong,
            CompressionMethod::Zstd,
        ] {
            let mut writer = ArchiveWriter::new(Vec::new(), method).unwrap();
            writer.write_all(b"tar bytes").unwrap();
            let compressed = writer.finish().unwrap();
            let name = format!("key-abc.{}", method.extension());
            assert_eq!(detect_method(&compressed, &name), Some(method));
        }
        assert_eq!(detect_method(b"archive", "key-abc.tar.gz"), None);
        assert_eq!(detect_method(b"", "key-abc.tar.zst"), None);
    }

    #[test]
    fn test_method_from_setting() {
        assert_eq!(method_from_setting(None).unwrap(), CompressionMethod::Zstd);
        assert_eq!(method_from_setting(Some("")).unwrap(), CompressionMethod::Zstd);
        assert_eq!(
            method_from_setting(Some("gzip")).unwrap(),
            CompressionMethod::Gzip
        );
        assert!(matches!(
            method_from_setting(Some("brotli")),
            Err(Error::Config(_))
        ));
    }
}
