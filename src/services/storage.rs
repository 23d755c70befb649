//! Package storage capability: filesystem-backed and discarding stores.

use anyhow::{Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Abstract package blob store.
///
/// Keys are forward-slash relative paths chosen by the caller
/// (`packages/<id>/<version>.pkg`); implementations decide where bytes land.
pub trait StorageService: Send + Sync {
    fn name(&self) -> &'static str;
    fn put(&self, key: &str, content: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Stores blobs under a configured root directory.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a key onto the store root, rejecting anything that would escape
    /// it. Absolute keys, `..` segments, and drive prefixes are refused
    /// before any filesystem access happens.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => bail!("storage key '{key}' escapes the store root"),
            }
        }
        if clean.as_os_str().is_empty() {
            bail!("storage key must not be empty");
        }
        Ok(self.root.join(clean))
    }
}

impl StorageService for FileStorage {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Accepts and discards everything; reads always miss.
pub struct NullStorage;

impl StorageService for NullStorage {
    fn name(&self) -> &'static str {
        "null"
    }

    fn put(&self, _key: &str, _content: &[u8]) -> Result<()> {
        Ok(())
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
