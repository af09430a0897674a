//! # Commands
//!
//! Commands are the only way the document and editor state are modified. Everything that reaches
//! [`crate::queue::History`] is a [`Command`], and the applied canvas commands are what gets saved.
//!
//! On the wire, commands are tagged by their `target` and then by their `type`:
//! `{"target": "canvas", "type": "renameLayer", "layerName": "a", "newName": "b"}`.

use std::sync::Arc;

pub use crate::state::canvas::commands::Command as CanvasCommand;
use crate::state::editor::EditorConfigChanges;

pub const PNG_TYPE: &str = "image/png";
pub const PNG_EXTENSION: &str = ".png";

#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryCommand {
    Undo,
    Redo,
}

#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FileCommand {
    Save,
    /// Save to a copy of the current file, which becomes the current file.
    SaveAs,
    Open,
    Export {
        #[serde(default = "default_file_type")]
        file_type: String,
        /// Empty means the usual extension of `file_type`, if known.
        #[serde(default)]
        file_ext: String,
    },
}
fn default_file_type() -> String {
    PNG_TYPE.to_owned()
}
impl FileCommand {
    /// Export with the given type, or PNG if `None`. The extension is filled in for PNG.
    #[must_use]
    pub fn export(file_type: Option<&str>, file_ext: Option<&str>) -> Self {
        let file_type = file_type.unwrap_or(PNG_TYPE).to_owned();
        let mut file_ext = file_ext.unwrap_or_default().to_owned();
        if file_ext.is_empty() && file_type == PNG_TYPE {
            file_ext = PNG_EXTENSION.to_owned();
        }
        Self::Export {
            file_type,
            file_ext,
        }
    }
}

/// Something that was copied, able to recreate itself as commands.
#[derive(Clone)]
pub struct ClipboardItem {
    pub description: String,
    paste: Arc<dyn Fn() -> Vec<Command> + Send + Sync>,
}
impl ClipboardItem {
    pub fn new(
        description: impl Into<String>,
        paste: impl Fn() -> Vec<Command> + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            paste: Arc::new(paste),
        }
    }
    /// An item which pastes `shape` back on top of `layer_name`, without merging.
    pub fn shape(
        description: impl Into<String>,
        layer_name: impl Into<String>,
        shape: crate::state::PositionedShape,
    ) -> Self {
        let layer_name = layer_name.into();
        Self::new(description, move || {
            vec![CanvasCommand::AddShape {
                layer_name: Some(layer_name.clone()),
                shape: shape.shape.clone(),
                before_index: None,
                origin: Some(shape.origin),
                merge_freeform: Some(false),
                mask: None,
            }
            .into()]
        })
    }
    #[must_use]
    pub fn paste(&self) -> Vec<Command> {
        (self.paste)()
    }
}
impl std::fmt::Debug for ClipboardItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardItem")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
impl PartialEq for ClipboardItem {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && std::ptr::addr_eq(Arc::as_ptr(&self.paste), Arc::as_ptr(&other.paste))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum ClipboardCommand {
    /// Replace the clipboard contents.
    Copy { item: ClipboardItem },
    /// Queue the clipboard's commands and empty it. Nothing happens if it's already empty.
    Paste,
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorCommand {
    ChangeConfig { changes: EditorConfigChanges },
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnyCommand {
    /// Canvas commands that are applied, undone, and redone as a unit.
    Atomic { commands: Vec<CanvasCommand> },
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum Command {
    Canvas(CanvasCommand),
    History(HistoryCommand),
    File(FileCommand),
    /// Clipboard contents are closures, and so never persisted.
    #[serde(skip)]
    Clipboard(ClipboardCommand),
    Editor(EditorCommand),
    Any(AnyCommand),
}
impl From<CanvasCommand> for Command {
    fn from(value: CanvasCommand) -> Self {
        Self::Canvas(value)
    }
}
impl From<HistoryCommand> for Command {
    fn from(value: HistoryCommand) -> Self {
        Self::History(value)
    }
}
impl From<FileCommand> for Command {
    fn from(value: FileCommand) -> Self {
        Self::File(value)
    }
}
impl From<ClipboardCommand> for Command {
    fn from(value: ClipboardCommand) -> Self {
        Self::Clipboard(value)
    }
}
impl From<EditorCommand> for Command {
    fn from(value: EditorCommand) -> Self {
        Self::Editor(value)
    }
}
impl From<AnyCommand> for Command {
    fn from(value: AnyCommand) -> Self {
        Self::Any(value)
    }
}
impl Command {
    #[must_use]
    pub fn atomic(commands: Vec<CanvasCommand>) -> Self {
        Self::Any(AnyCommand::Atomic { commands })
    }
    #[must_use]
    pub fn copy(item: ClipboardItem) -> Self {
        Self::Clipboard(ClipboardCommand::Copy { item })
    }
    #[must_use]
    pub fn change_config(changes: EditorConfigChanges) -> Self {
        Self::Editor(EditorCommand::ChangeConfig { changes })
    }
    /// Whether this command changes the canvas, and is thus recorded as applied.
    #[must_use]
    pub fn is_document_change(&self) -> bool {
        matches!(self, Self::Canvas(_) | Self::Any(_))
    }
    #[must_use]
    pub fn canvas(&self) -> Option<&CanvasCommand> {
        match self {
            Self::Canvas(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn history(&self) -> Option<&HistoryCommand> {
        match self {
            Self::History(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn file(&self) -> Option<&FileCommand> {
        match self {
            Self::File(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn clipboard(&self) -> Option<&ClipboardCommand> {
        match self {
            Self::Clipboard(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn editor(&self) -> Option<&EditorCommand> {
        match self {
            Self::Editor(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn any(&self) -> Option<&AnyCommand> {
        match self {
            Self::Any(c) => Some(c),
            _ => None,
        }
    }
}
