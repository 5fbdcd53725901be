//! Flat-directory document store.
//!
//! Every document is one regular file directly inside the data directory. The
//! file name is the document's identity: there is no index, no metadata and
//! no versioning. Names are validated before they are joined onto the
//! directory so a request can never reach outside of it.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Errors produced by [`DocumentStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("A name is required.")]
    EmptyName,

    #[error("{0}")]
    InvalidName(&'static str),

    #[error("{0} already exists.")]
    AlreadyExists(String),

    #[error("{0} does not exist.")]
    NotFound(String),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// `true` for the errors caused by the name a user typed, as opposed to
    /// the state of the disk.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyName | Self::InvalidName(_) | Self::AlreadyExists(_))
    }
}

/// Checks that `name` is usable as a document name.
///
/// A name is a single, non-hidden path component.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidName("A name may not contain path separators."));
    }
    if name.starts_with('.') {
        return Err(StoreError::InvalidName("A name may not start with a dot."));
    }
    Ok(())
}

/// Documents kept as files in a single directory.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of every document, sorted.
    ///
    /// Hidden files, directories and names that are not valid UTF-8 are
    /// skipped.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_name(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let Ok(path) = self.path_for(name) else {
            return Ok(false);
        };
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.existing_path(name)?;
        fs::read(&path).await.map_err(|e| not_found_or_io(e, name))
    }

    /// Replaces the content of `name`, creating the file if it is absent.
    pub async fn write(&self, name: &str, content: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::write(&path, content).await?;
        Ok(())
    }

    /// Creates a new, empty document. Fails if the name is empty, invalid or
    /// already taken.
    pub async fn create_empty(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(name.to_owned()),
                _ => StoreError::Io(e),
            })?;
        file.flush().await?;
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.existing_path(name)?;
        fs::remove_file(&path).await.map_err(|e| not_found_or_io(e, name))
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Like `path_for`, but an unusable name is reported as a missing document.
    fn existing_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        self.path_for(name).map_err(|_| StoreError::NotFound(name.to_owned()))
    }
}

fn not_found_or_io(e: io::Error, name: &str) -> StoreError {
    match e.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(name.to_owned()),
        _ => StoreError::Io(e),
    }
}
