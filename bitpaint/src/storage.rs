//! Filesystem storage for a single document, with every derived file (copies, exports) placed
//! next to it.

use std::path::{Path, PathBuf};

use bitpaint_core::io::storage::{extension, File, Storage, StorageError};
use bitpaint_core::io::SOURCE_EXTENSION;

pub struct FsStorage {
    source: PathBuf,
}
impl FsStorage {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
    /// Where a file with the given extension derived from the source would go.
    /// `art.pd.json` becomes `art.png` for `".png"`.
    #[must_use]
    pub fn sibling(&self, extension: &str) -> PathBuf {
        self.source.with_file_name(format!("{}{extension}", stem(&self.source)))
    }
}

/// File name without the document extension, or without any extension otherwise.
fn stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(SOURCE_EXTENSION) {
        Some(stem) => stem.to_owned(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

impl Storage for FsStorage {
    fn new_unsaved(&self, extension: &str) -> Box<dyn File> {
        Box::new(FsFile::new(self.sibling(extension), Vec::new()))
    }
    fn open_existing(&self, extension: &str) -> Result<Box<dyn File>, StorageError> {
        let name = self.source.to_string_lossy();
        if !name.ends_with(extension) {
            return Err(StorageError::NotFound(name.into_owned()));
        }
        let contents = std::fs::read(&self.source)?;
        Ok(Box::new(FsFile::new(self.source.clone(), contents)))
    }
}

struct FsFile {
    path: PathBuf,
    name: String,
    contents: Vec<u8>,
}
impl FsFile {
    fn new(path: PathBuf, contents: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            contents,
        }
    }
}
impl File for FsFile {
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
        log::debug!("Writing {:?}", self.path);
        std::fs::write(&self.path, &self.contents)?;
        Ok(())
    }
    fn copy(&self) -> Result<Box<dyn File>, StorageError> {
        let extension = extension(&self.name);
        let path = self
            .path
            .with_file_name(format!("{} copy{extension}", stem(&self.path)));
        Ok(Box::new(Self::new(path, self.contents.clone())))
    }
}
