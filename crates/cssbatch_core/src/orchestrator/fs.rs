//! Filesystem access used by a run.

use std::path::Path;

use super::errors::{RunError, RunResult};

/// Whether `path` is an existing regular file.
pub async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Read a source file.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// failing the read.
pub async fn read(path: &Path) -> RunResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| RunError::io("reading", path, e))?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Write an artifact, creating parent directories and overwriting any
/// existing file.
pub async fn write(path: &Path, contents: &str) -> RunResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RunError::io("creating directory", parent, e))?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|e| RunError::io("writing", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn write_creates_parents_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.css");

        write(&path, "first").await.unwrap();
        write(&path, "second").await.unwrap();

        assert_eq!(read(&path).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn directories_do_not_count_as_sources() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.css");
        std::fs::write(&file, "a{}").unwrap();

        assert!(exists(&file).await);
        assert!(!exists(dir.path()).await);
        assert!(!exists(&dir.path().join("missing.css")).await);
    }

    #[tokio::test]
    async fn read_decodes_invalid_utf8_lossily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.css");
        std::fs::write(&path, [0x61, 0xff, 0x7b, 0x7d]).unwrap();

        assert_eq!(read(&path).await.unwrap(), "a\u{fffd}{}");
    }

    #[tokio::test]
    async fn read_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read(&dir.path().join("missing.css")).await.unwrap_err();
        assert!(matches!(err, RunError::Io { .. }));
    }
}
