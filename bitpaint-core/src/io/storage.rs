//! # Storage
//!
//! Where documents and exports are read from and written to. The core never touches the
//! filesystem itself, instead going through a [`Storage`] provided by the application.

use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no file was chosen")]
    Cancelled,
    #[error("file {0:?} not found")]
    NotFound(String),
}

/// A handle to some file's contents, which are only written out on [`File::save`].
pub trait File: Send {
    fn name(&self) -> &str;
    fn contents(&self) -> &[u8];
    fn set_contents(&mut self, contents: Vec<u8>);
    /// # Errors
    /// Errors from the underlying storage.
    fn save(&mut self) -> Result<(), StorageError>;
    /// A new, unsaved file with the same extension and contents.
    /// # Errors
    /// Errors from the underlying storage, or [`StorageError::Cancelled`].
    fn copy(&self) -> Result<Box<dyn File>, StorageError>;
}

pub trait Storage: Send {
    /// A file which does not exist until it is saved.
    fn new_unsaved(&self, extension: &str) -> Box<dyn File>;
    /// Choose and read an existing file.
    /// # Errors
    /// [`StorageError::Cancelled`] if nothing was chosen, otherwise errors reading the file.
    fn open_existing(&self, extension: &str) -> Result<Box<dyn File>, StorageError>;
}

/// The extension of a file name, from the first dot. `"a.pd.json"` is `".pd.json"`.
#[must_use]
pub fn extension(name: &str) -> &str {
    name.find('.').map_or("", |idx| &name[idx..])
}

#[derive(Default)]
struct MemoryStorageInner {
    files: hashbrown::HashMap<String, Vec<u8>>,
    next_open: Option<String>,
    counter: u32,
}
/// Storage held entirely in memory. Clones share the same files.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<parking_lot::Mutex<MemoryStorageInner>>,
}
impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&self, name: impl Into<String>, contents: Vec<u8>) {
        self.inner.lock().files.insert(name.into(), contents);
    }
    /// Contents of a saved file.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.inner.lock().files.get(name).cloned()
    }
    /// Names of all saved files, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.lock().files.keys().cloned().collect();
        names.sort();
        names
    }
    /// Set the file the next [`Storage::open_existing`] picks, once.
    pub fn choose_next_open(&self, name: impl Into<String>) {
        self.inner.lock().next_open = Some(name.into());
    }
    fn unsaved(&self, extension: &str, contents: Vec<u8>) -> MemoryFile {
        let mut inner = self.inner.lock();
        inner.counter += 1;
        MemoryFile {
            name: format!("untitled-{}{extension}", inner.counter),
            contents,
            storage: self.clone(),
        }
    }
}
impl Storage for MemoryStorage {
    fn new_unsaved(&self, extension: &str) -> Box<dyn File> {
        Box::new(self.unsaved(extension, Vec::new()))
    }
    fn open_existing(&self, extension: &str) -> Result<Box<dyn File>, StorageError> {
        let mut inner = self.inner.lock();
        let name = inner.next_open.take().ok_or(StorageError::Cancelled)?;
        if !name.ends_with(extension) {
            return Err(StorageError::NotFound(name));
        }
        let contents = inner
            .files
            .get(&name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.clone()))?;
        Ok(Box::new(MemoryFile {
            name,
            contents,
            storage: self.clone(),
        }))
    }
}

struct MemoryFile {
    name: String,
    contents: Vec<u8>,
    storage: MemoryStorage,
}
impl File for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }
    fn contents(&self) -> &[u8] {
        &self.contents
    }
    fn set_contents(&mut self, contents: Vec<u8>) {
        self.contents = contents;
    }
    fn save(&mut self) -> Result<(), StorageError> {
        self.storage.insert(self.name.clone(), self.contents.clone());
        Ok(())
    }
    fn copy(&self) -> Result<Box<dyn File>, StorageError> {
        Ok(Box::new(
            self.storage
                .unsaved(extension(&self.name), self.contents.clone()),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extensions() {
        assert_eq!(extension("a.pd.json"), ".pd.json");
        assert_eq!(extension("a.png"), ".png");
        assert_eq!(extension("a"), "");
    }
    #[test]
    fn unsaved_until_saved() {
        let storage = MemoryStorage::new();
        let mut file = storage.new_unsaved(".txt");
        file.set_contents(b"hi".to_vec());
        assert!(storage.names().is_empty());
        file.save().unwrap();
        assert_eq!(storage.get(file.name()), Some(b"hi".to_vec()));

        let copy = file.copy().unwrap();
        assert_ne!(copy.name(), file.name());
        assert_eq!(extension(copy.name()), ".txt");
        assert_eq!(copy.contents(), b"hi");
        assert_eq!(storage.names().len(), 1);
    }
    #[test]
    fn open_chosen_file() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.open_existing(".txt"),
            Err(StorageError::Cancelled)
        ));
        storage.insert("a.txt", b"a".to_vec());
        storage.choose_next_open("a.txt");
        assert_eq!(storage.open_existing(".txt").unwrap().contents(), b"a");
        // Choice is consumed.
        assert!(storage.open_existing(".txt").is_err());
        storage.choose_next_open("b.txt");
        assert!(matches!(
            storage.open_existing(".txt"),
            Err(StorageError::NotFound(_))
        ));
    }
}
