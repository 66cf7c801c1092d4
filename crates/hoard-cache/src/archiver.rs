//! Tar archive codec over gzip and zstd streams.

use crate::compression::{ArchiveWriter, archive_reader};
use async_trait::async_trait;
use hoard_core::ports::ArchiveCodec;
use hoard_core::{CompressionMethod, Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Top-level entry holding paths that live outside the working directory,
/// stored by their components from the filesystem root.
const ROOT_ENTRY: &str = "__root__";

/// Name of the archive entry for `path`.
fn entry_name(path: &Path) -> Result<PathBuf> {
    if !path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let mut name = PathBuf::from(ROOT_ENTRY);
    for component in path.components() {
        match component {
            Component::RootDir => {}
            Component::Normal(part) => name.push(part),
            _ => {
                return Err(Error::Codec(format!(
                    "Cannot archive path {}",
                    path.display()
                )));
            }
        }
    }
    Ok(name)
}

/// Absolute filesystem path of an entry stored under [`ROOT_ENTRY`].
fn rooted_target(rest: &Path) -> Result<PathBuf> {
    let mut target = PathBuf::from(std::path::MAIN_SEPARATOR_STR);
    for component in rest.components() {
        match component {
            Component::Normal(part) => target.push(part),
            _ => {
                return Err(Error::Codec(format!(
                    "Invalid entry path: {}",
                    rest.display()
                )));
            }
        }
    }
    Ok(target)
}

/// Create an archive of `paths`. Relative paths are resolved against
/// `base_dir` and stored under that name; absolute paths are stored under
/// [`ROOT_ENTRY`].
pub fn create_archive<W: Write>(
    writer: W,
    paths: &[PathBuf],
    base_dir: &Path,
    method: CompressionMethod,
) -> Result<W> {
    let encoder = ArchiveWriter::new(writer, method)?;
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for p in paths {
        let abs_path = base_dir.join(p);
        let name = entry_name(p)?;
        if abs_path.is_dir() {
            builder
                .append_dir_all(&name, &abs_path)
                .map_err(|e| Error::Codec(format!("Failed to pack dir {}: {}", p.display(), e)))?;
        } else {
            builder
                .append_path_with_name(&abs_path, &name)
                .map_err(|e| Error::Codec(format!("Failed to pack file {}: {}", p.display(), e)))?;
        }
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| Error::Codec(format!("Failed to finish tar: {}", e)))?;
    encoder.finish()
}

/// Extract an archive to a destination. Entries under [`ROOT_ENTRY`] go back
/// to their absolute location.
pub fn extract_archive<R: Read>(reader: R, dest: &Path, method: CompressionMethod) -> Result<()> {
    let decoder = archive_reader(reader, method)?;
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    std::fs::create_dir_all(dest)?;
    let entries = archive
        .entries()
        .map_err(|e| Error::Codec(format!("Failed to unpack archive: {}", e)))?;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::Codec(format!("Failed to unpack archive: {}", e)))?;
        let name = entry
            .path()
            .map_err(|e| Error::Codec(format!("Invalid entry path: {}", e)))?
            .into_owned();

        match name.strip_prefix(ROOT_ENTRY) {
            Ok(rest) => {
                let target = rooted_target(rest)?;
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                entry.unpack(&target).map_err(|e| {
                    Error::Codec(format!("Failed to unpack {}: {}", target.display(), e))
                })?;
            }
            Err(_) => {
                entry.unpack_in(dest).map_err(|e| {
                    Error::Codec(format!("Failed to unpack {}: {}", name.display(), e))
                })?;
            }
        }
    }
    Ok(())
}

/// List the entry paths of an archive, with rooted entries shown as absolute
/// paths.
pub fn list_archive<R: Read>(reader: R, method: CompressionMethod) -> Result<Vec<String>> {
    let decoder = archive_reader(reader, method)?;
    let mut archive = tar::Archive::new(decoder);
    let entries = archive
        .entries()
        .map_err(|e| Error::Codec(format!("Failed to read archive: {}", e)))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Codec(format!("Failed to read entry: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| Error::Codec(format!("Invalid entry path: {}", e)))?;
        let shown = match path.strip_prefix(ROOT_ENTRY) {
            Ok(rest) => rooted_target(rest)?,
            Err(_) => path.into_owned(),
        };
        names.push(shown.display().to_string());
    }
    Ok(names)
}

/// [`ArchiveCodec`] backed by the `tar` crate, run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarCodec;

impl TarCodec {
    pub fn new() -> Self {
        Self
    }
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::Internal(format!("Archive task failed: {}", e)))?
}

#[async_trait]
impl ArchiveCodec for TarCodec {
    async fn create(
        &self,
        archive_path: &Path,
        working_dir: &Path,
        paths: &[PathBuf],
        method: CompressionMethod,
    ) -> Result<()> {
        let archive_path = archive_path.to_path_buf();
        let working_dir = working_dir.to_path_buf();
        let paths = paths.to_vec();
        blocking(move || {
            let file = File::create(&archive_path)?;
            let mut writer = create_archive(BufWriter::new(file), &paths, &working_dir, method)?;
            writer.flush()?;
            Ok(())
        })
        .await
    }

    async fn extract(
        &self,
        archive_path: &Path,
        dest: &Path,
        method: CompressionMethod,
    ) -> Result<()> {
        let archive_path = archive_path.to_path_buf();
        let dest = dest.to_path_buf();
        blocking(move || {
            let file = File::open(&archive_path)?;
            extract_archive(BufReader::new(file), &dest, method)
        })
        .await
    }

    async fn list(&self, archive_path: &Path, method: CompressionMethod) -> Result<Vec<String>> {
        let archive_path = archive_path.to_path_buf();
        blocking(move || {
            let file = File::open(&archive_path)?;
            list_archive(BufReader::new(file), method)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("deps/nested")).unwrap();
        std::fs::write(dir.path().join("deps/nested/lib.txt"), b"library").unwrap();
        std::fs::write(dir.path().join("lock.json"), b"{}").unwrap();
        dir
    }

    #[test]
    fn test_archive_extract_preserves_contents() {
        let src = workspace();
        let paths = vec![PathBuf::from("deps"), PathBuf::from("lock.json")];

        let bytes = create_archive(Vec::new(), &paths, src.path(), CompressionMethod::Zstd).unwrap();

        let dest = tempfile::tempdir().unwrap();
        extract_archive(bytes.as_slice(), dest.path(), CompressionMethod::Zstd).unwrap();

        assert_eq!(
            std::fs::read(dest.path().join("deps/nested/lib.txt")).unwrap(),
            b"library"
        );
        assert_eq!(std::fs::read(dest.path().join("lock.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_list_archive_entries() {
        let src = workspace();
        let paths = vec![PathBuf::from("lock.json"), PathBuf::from("deps")];
        let bytes = create_archive(Vec::new(), &paths, src.path(), CompressionMethod::Gzip).unwrap();

        let names = list_archive(bytes.as_slice(), CompressionMethod::Gzip).unwrap();
        assert!(names.contains(&"lock.json".to_string()));
        assert!(names.iter().any(|n| n.ends_with("nested/lib.txt")));
    }

    #[test]
    fn test_extract_with_wrong_method_fails() {
        let src = workspace();
        let paths = vec![PathBuf::from("lock.json")];
        let bytes = create_archive(Vec::new(), &paths, src.path(), CompressionMethod::Gzip).unwrap();

        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(bytes.as_slice(), dest.path(), CompressionMethod::Zstd).unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
    }

    #[test]
    fn test_missing_path_is_codec_error() {
        let src = workspace();
        let paths = vec![PathBuf::from("absent.bin")];
        let err = create_archive(Vec::new(), &paths, src.path(), CompressionMethod::Gzip).unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_outside_base_dir_returns_to_its_location() {
        let src = workspace();
        let outside = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(outside.path().join("npm/_cacache")).unwrap();
        std::fs::write(outside.path().join("npm/_cacache/index"), b"entries").unwrap();
        let paths = vec![PathBuf::from("lock.json"), outside.path().join("npm")];

        let bytes = create_archive(Vec::new(), &paths, src.path(), CompressionMethod::Zstd).unwrap();
        let names = list_archive(bytes.as_slice(), CompressionMethod::Zstd).unwrap();
        assert!(names.contains(&outside.path().join("npm/_cacache/index").display().to_string()));

        std::fs::remove_dir_all(outside.path().join("npm")).unwrap();
        let dest = tempfile::tempdir().unwrap();
        extract_archive(bytes.as_slice(), dest.path(), CompressionMethod::Zstd).unwrap();

        assert_eq!(
            std::fs::read(outside.path().join("npm/_cacache/index")).unwrap(),
            b"entries"
        );
        assert!(dest.path().join("lock.json").is_file());
        assert!(!dest.path().join(ROOT_ENTRY).exists());
    }

    #[test]
    fn test_rooted_target_rejects_parent_components() {
        assert!(rooted_target(Path::new("home/../etc")).is_err());
        assert!(rooted_target(Path::new("home/user/.npm")).is_ok());
    }

    #[tokio::test]
    async fn test_tar_codec_file_roundtrip() {
        let src = workspace();
        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("cache.tzst");
        let codec = TarCodec::new();

        codec
            .create(
                &archive,
                src.path(),
                &[PathBuf::from("deps")],
                CompressionMethod::Zstd,
            )
            .await
            .unwrap();

        let dest = tempfile::tempdir().unwrap();
        codec
            .extract(&archive, dest.path(), CompressionMethod::Zstd)
            .await
            .unwrap();
        assert!(dest.path().join("deps/nested/lib.txt").is_file());
    }
}
