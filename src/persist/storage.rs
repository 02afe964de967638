use crate::error::StorageError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Durable string key-value storage for snapshots.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    disabled: bool,
}

/// In-memory storage. Clones share the same entries, which lets a second
/// form instance see what the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes that would push the total stored bytes over `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        if let Ok(mut inner) = storage.inner.lock() {
            inner.quota = Some(bytes);
        }
        storage
    }

    /// Storage that fails every operation.
    pub fn disabled() -> Self {
        let storage = Self::new();
        if let Ok(mut inner) = storage.inner.lock() {
            inner.disabled = true;
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_inner<T>(
        &self,
        f: impl FnOnce(&mut MemoryInner) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut inner = self.inner.lock().map_err(|_| StorageError::Unavailable)?;
        if inner.disabled {
            return Err(StorageError::Unavailable);
        }
        f(&mut inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_inner(|inner| Ok(inner.entries.get(key).cloned()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_inner(|inner| {
            if let Some(quota) = inner.quota {
                let others: usize = inner
                    .entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                let needed = others + key.len() + value.len();
                if needed > quota {
                    return Err(StorageError::QuotaExceeded { needed, quota });
                }
            }
            inner.entries.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.with_inner(|inner| {
            inner.entries.remove(key);
            Ok(())
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::Storage;
    use crate::error::StorageError;
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};

    /// One JSON file per key inside a directory. Writes go through a
    /// temporary file and are renamed into place.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn path_for(&self, key: &str) -> PathBuf {
            let file_name: String = key
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            self.dir.join(format!("{file_name}.json"))
        }
    }

    impl Storage for FileStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match std::fs::read_to_string(self.path_for(key)) {
                Ok(text) => Ok(Some(text)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            std::fs::create_dir_all(&self.dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.flush()?;
            tmp.persist(self.path_for(key)).map_err(|err| err.error)?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            match std::fs::remove_file(self.path_for(key)) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
    }
}
