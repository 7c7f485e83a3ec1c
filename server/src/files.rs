//! Directory-backed blob store for uploaded recipe images.
//!
//! Blobs live directly under the store root as `{uuid}.{ext}`. Names handed to
//! the store must be a single plain path component, which keeps every read and
//! write inside the root no matter what a client puts in a URL.

use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Longest extension carried over from a client filename.
const MAX_EXTENSION_LEN: usize = 10;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum FileStoreError {
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("File store I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a fresh blob name, keeping the extension of the client's filename
    /// when it is short and alphanumeric.
    pub fn generate_name(original_filename: &str) -> String {
        let stem = Uuid::new_v4().simple().to_string();
        match sanitized_extension(original_filename) {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        }
    }

    /// MIME type guessed from a blob name's extension.
    pub fn content_type(name: &str) -> &'static str {
        ImageFormat::from_path(name)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == OsStr::new(name) => {
                Ok(self.root.join(part))
            }
            _ => Err(FileStoreError::InvalidName(name.to_string())),
        }
    }

    /// Write a new blob. Fails rather than overwrite an existing one.
    pub async fn save(&self, name: &str, data: &[u8]) -> Result<(), FileStoreError> {
        let path = self.resolve(name)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        write_or_discard(&path, file, data).await?;
        Ok(())
    }

    /// Read a blob, returning `None` when it does not exist.
    pub async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, FileStoreError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a blob. Removing a missing blob is not an error.
    pub async fn remove(&self, name: &str) -> Result<(), FileStoreError> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `data` to a freshly created file, removing it again if the write fails.
async fn write_or_discard<W>(path: &Path, mut writer: W, data: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(data).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(writer);
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), "Failed to remove partial blob: {}", cleanup);
        }
        return Err(e);
    }
    Ok(())
}

fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;

    /// Writer that fails every write, like a full disk.
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no space left")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn test_generate_name_keeps_extension() {
        let name = FileStore::generate_name("My Photo.JPG");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 32 + ".jpg".len());
    }

    #[test]
    fn test_generate_name_is_unique() {
        let a = FileStore::generate_name("cake.png");
        let b = FileStore::generate_name("cake.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_name_drops_odd_extensions() {
        assert_eq!(FileStore::generate_name("noext").len(), 32);
        assert_eq!(FileStore::generate_name("evil.p/h").len(), 32);
        assert_eq!(FileStore::generate_name("x.verylongextension").len(), 32);
        assert_eq!(FileStore::generate_name("x.j-g").len(), 32);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(FileStore::content_type("a.png"), "image/png");
        assert_eq!(FileStore::content_type("a.jpg"), "image/jpeg");
        assert_eq!(FileStore::content_type("a"), "application/octet-stream");
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for name in ["", ".", "..", "../secret", "a/b", "/etc/passwd", "a/"] {
            assert!(
                matches!(store.resolve(name), Err(FileStoreError::InvalidName(_))),
                "{:?} should be rejected",
                name
            );
        }
        assert_eq!(store.resolve("abc.png").unwrap(), dir.path().join("abc.png"));
    }

    #[tokio::test]
    async fn test_save_read_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        store.save("blob.png", b"hello").await.unwrap();
        assert_eq!(store.read("blob.png").await.unwrap(), Some(b"hello".to_vec()));

        // Existing blobs are never overwritten
        assert!(store.save("blob.png", b"other").await.is_err());

        store.remove("blob.png").await.unwrap();
        assert_eq!(store.read("blob.png").await.unwrap(), None);
        store.remove("blob.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_partial_blob() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("half.png");
        std::fs::write(&path, b"half").unwrap();

        let err = write_or_discard(&path, FullDisk, b"whole image").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_over_existing_keeps_original() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.save("blob.png", b"first").await.unwrap();
        assert!(store.save("blob.png", b"second").await.is_err());
        assert_eq!(store.read("blob.png").await.unwrap(), Some(b"first".to_vec()));
    }
}
