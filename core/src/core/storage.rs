use std::io::Write;

use async_trait::async_trait;
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use enum_dispatch::enum_dispatch;
use eyre::{Context, Result};
use flate2::{write::GzEncoder, Compression};
use tracing::{debug, instrument, warn, Instrument};

use crate::catalog::storage_key;

/// Abstraction for storing asset files in a backing store.
/// Every object has a `key` used to store and retrieve it, and every object
/// written through `write_with_shadow` is accompanied by a gzip compressed
/// copy under `storage_key::shadow(key)`.
#[async_trait]
#[enum_dispatch(Storage)]
pub trait StorageProvider: Clone {
    /// Writes `contents` to a new object `key` and its compressed shadow.
    /// Fails if `key` already exists. On failure neither the object nor the
    /// shadow are left behind.
    async fn write_with_shadow(&self, key: &str, contents: Vec<u8>) -> Result<()>;
    /// Removes `key` and its shadow. Failures are logged and otherwise ignored.
    async fn remove_with_shadow(&self, key: &str);
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageReadError>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

#[derive(thiserror::Error, Debug)]
pub enum StorageReadError {
    #[error("File with key '{0}' does not exist")]
    FileNotFound(String),
    #[error(transparent)]
    IOError {
        #[from]
        source: tokio::io::Error,
    },
    #[error(transparent)]
    Unknown {
        #[from]
        source: eyre::Report,
    },
}

#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum Storage {
    LocalFileStorage,
}

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf) -> LocalFileStorage {
        LocalFileStorage { root }
    }
}

#[async_trait]
impl StorageProvider for LocalFileStorage {
    #[instrument(skip(self, contents), fields(len = contents.len()), level = "debug")]
    async fn write_with_shadow(&self, key: &str, contents: Vec<u8>) -> Result<()> {
        let path = self.root.join(key);
        let shadow_path = self.root.join(storage_key::shadow(key));
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _enter = span.enter();
            write_file_and_shadow(&path, &shadow_path, &contents)
        })
        .await
        .wrap_err("file writing task panicked")?
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_with_shadow(&self, key: &str) {
        remove_logged(&self.root.join(key)).in_current_span().await;
        remove_logged(&self.root.join(storage_key::shadow(key)))
            .in_current_span()
            .await;
    }

    #[instrument(skip(self), level = "debug")]
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageReadError> {
        use tokio::io::ErrorKind;
        match tokio::fs::read(self.root.join(key)).await {
            Ok(contents) => Ok(contents),
            Err(err) => Err(match err.kind() {
                ErrorKind::NotFound => StorageReadError::FileNotFound(key.to_owned()),
                _ => StorageReadError::IOError { source: err },
            }),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists(&self, key: &str) -> Result<bool> {
        tokio::fs::try_exists(self.root.join(key))
            .await
            .wrap_err("error checking if path exists")
    }
}

fn write_file_and_shadow(path: &Path, shadow_path: &Path, contents: &[u8]) -> Result<()> {
    create_and_write(path, |file| file.write_all(contents))?;
    let shadow_result = create_and_write(shadow_path, |file| {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(contents)?;
        encoder.finish()?;
        Ok(())
    });
    if let Err(err) = shadow_result {
        remove_logged_blocking(path);
        return Err(err);
    }
    Ok(())
}

/// Creates a new file at `path` and fills it using `write`.
/// An existing file is never touched. If writing fails after the file was
/// created, the partial file is removed again.
fn create_and_write(
    path: &Path,
    write: impl FnOnce(&mut std::fs::File) -> std::io::Result<()>,
) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .wrap_err_with(|| format!("error creating file {}", path))?;
    let write_result = write(&mut file).and_then(|_| file.sync_all());
    if let Err(err) = write_result {
        drop(file);
        remove_logged_blocking(path);
        return Err(err).wrap_err_with(|| format!("error writing file {}", path));
    }
    Ok(())
}

fn remove_logged_blocking(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(%path, "removed file"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(%path, %err, "could not remove file"),
    }
}

async fn remove_logged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(%path, "removed file"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(%path, "file to remove did not exist")
        }
        Err(err) => warn!(%path, %err, "could not remove file"),
    }
}

#[cfg(test)]
mod test {
    use std::io::Read;

    use claims::{assert_err, assert_matches, assert_ok};
    use flate2::read::GzDecoder;
    use pretty_assertions::assert_eq;

    use super::*;

    fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, LocalFileStorage::new(root).into())
    }

    fn gunzip(compressed: &[u8]) -> Vec<u8> {
        let mut decoded = Vec::new();
        GzDecoder::new(compressed).read_to_end(&mut decoded).unwrap();
        decoded
    }

    fn files_in(dir: &tempfile::TempDir) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn write_creates_primary_and_shadow() {
        let (dir, storage) = temp_storage();
        let contents: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        assert_ok!(storage.write_with_shadow("a.png", contents.clone()).await);
        assert_eq!(files_in(&dir), vec!["a.png", "a.png.gz"]);
        let primary = assert_ok!(storage.read("a.png").await);
        assert_eq!(primary, contents);
        let shadow = assert_ok!(storage.read("a.png.gz").await);
        assert_eq!(gunzip(&shadow), contents);
    }

    #[tokio::test]
    async fn write_does_not_overwrite_existing_file() {
        let (dir, storage) = temp_storage();
        std::fs::write(dir.path().join("a.png"), b"original").unwrap();
        let _ = assert_err!(storage.write_with_shadow("a.png", b"new".to_vec()).await);
        assert_eq!(files_in(&dir), vec!["a.png"]);
        assert_eq!(assert_ok!(storage.read("a.png").await), b"original");
    }

    #[tokio::test]
    async fn failed_shadow_write_removes_primary() {
        let (dir, storage) = temp_storage();
        // a directory in place of the shadow makes creating it fail
        std::fs::create_dir(dir.path().join("a.png.gz")).unwrap();
        let _ = assert_err!(storage.write_with_shadow("a.png", b"contents".to_vec()).await);
        assert!(!assert_ok!(storage.exists("a.png").await));
        assert_eq!(files_in(&dir), vec!["a.png.gz"]);
    }

    #[tokio::test]
    async fn remove_deletes_both_files() {
        let (dir, storage) = temp_storage();
        assert_ok!(storage.write_with_shadow("b.gif", b"gif".to_vec()).await);
        assert_ok!(storage.write_with_shadow("c.gif", b"gif".to_vec()).await);
        storage.remove_with_shadow("b.gif").await;
        assert_eq!(files_in(&dir), vec!["c.gif", "c.gif.gz"]);
    }

    #[tokio::test]
    async fn remove_missing_files_is_not_an_error() {
        let (dir, storage) = temp_storage();
        std::fs::write(dir.path().join("half.png"), b"x").unwrap();
        storage.remove_with_shadow("half.png").await;
        storage.remove_with_shadow("nothing.png").await;
        assert!(files_in(&dir).is_empty());
    }

    #[tokio::test]
    async fn read_missing_file() {
        let (_dir, storage) = temp_storage();
        let err = assert_err!(storage.read("nope.png").await);
        assert_matches!(err, StorageReadError::FileNotFound(key) if key == "nope.png");
    }
}
