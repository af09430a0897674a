//! # IO
//!
//! The saved document format, and the seams through which documents reach storage and images
//! reach encoders.
//!
//! A document is saved as its command log rather than its contents:
//! `{"appVersion": .., "version": "0.1", "settings": {..}, "history": [change, ..]}`.
//! Opening one replays the log.

pub mod storage;

use crate::color::Color;
use crate::grid::Grid;
use crate::queue::Change;
use crate::state::canvas::CanvasSettings;

pub const SOURCE_EXTENSION: &str = ".pd.json";
pub const FILE_VERSION: &str = "0.1";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Storage(#[from] storage::StorageError),
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected file version")]
    MissingVersion,
    #[error("unsupported file version {0:?}")]
    UnsupportedVersion(String),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("unsupported image type {0:?}")]
    UnsupportedType(String),
    #[error("encoding failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Turns a flattened canvas into the bytes of an image file.
pub trait GridEncoder: Send {
    /// # Errors
    /// [`EncodeError::UnsupportedType`] if `file_type` (a MIME type) is not known to this encoder.
    fn encode(&self, file_type: &str, grid: &Grid<Color>) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(default)]
    pub app_version: String,
    pub version: String,
    #[serde(default)]
    pub settings: CanvasSettings,
    #[serde(default)]
    pub history: Vec<Change>,
}
/// Just enough of a file to decide how to read the rest.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceFileHeader {
    #[serde(default)]
    version: Option<String>,
}
impl SourceFile {
    #[must_use]
    pub fn new(settings: CanvasSettings, history: Vec<Change>) -> Self {
        Self {
            app_version: APP_VERSION.to_owned(),
            version: FILE_VERSION.to_owned(),
            settings,
            history,
        }
    }
    /// # Errors
    /// Malformed JSON, or a version this build does not read.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FileError> {
        let header: SourceFileHeader = serde_json::from_slice(bytes)?;
        match header.version {
            None => return Err(FileError::MissingVersion),
            Some(version) if version != FILE_VERSION => {
                return Err(FileError::UnsupportedVersion(version))
            }
            Some(_) => (),
        }
        Ok(serde_json::from_slice(bytes)?)
    }
    /// Pretty-printed JSON.
    /// # Errors
    /// If the history contains commands that cannot be persisted.
    pub fn to_vec(&self) -> Result<Vec<u8>, FileError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
