//! Command Queue
//!
//! [`History`] is the ground truth of a document. Commands are queued, then drained in order, and
//! every applied canvas change is recorded so that the canvas can be rebuilt by replaying them.
//!
//! Undo is replay-based: the latest change is set aside, the canvas is discarded, and everything
//! that remains is queued again ahead of whatever was already waiting. Atomic groups that fail
//! part-way are rolled back the same way.

use std::collections::VecDeque;

use crate::commands::{
    AnyCommand, ClipboardCommand, ClipboardItem, Command, EditorCommand, FileCommand,
    HistoryCommand, PNG_EXTENSION, PNG_TYPE,
};
use crate::io::storage::{File, Storage};
use crate::io::{FileError, GridEncoder, SourceFile, SOURCE_EXTENSION};
use crate::state::canvas::{Canvas, CanvasError};
use crate::state::editor::EditorConfig;

pub mod writer;

/// A command, as it was queued.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct Change {
    #[serde(rename = "uuid")]
    pub id: uuid::Uuid,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
    pub command: Command,
}
impl Change {
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: crate::util::now_millis(),
            command,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("error atomically applying commands: {0}")]
    Atomic(#[source] CanvasError),
}
impl HistoryError {
    /// The canvas error behind this one.
    #[must_use]
    pub fn canvas_error(&self) -> &CanvasError {
        match self {
            Self::Canvas(e) | Self::Atomic(e) => e,
        }
    }
}

pub struct History {
    /// Oldest first.
    applied: Vec<Change>,
    /// Most recently undone last.
    undone: Vec<Change>,
    queued: VecDeque<Change>,
    clipboard: Option<ClipboardItem>,
    canvas: Canvas,
    editor_config: EditorConfig,
    storage: Box<dyn Storage>,
    encoder: Box<dyn GridEncoder>,
    source_file: Box<dyn File>,
}
impl History {
    pub fn new(storage: impl Storage + 'static, encoder: impl GridEncoder + 'static) -> Self {
        let source_file = storage.new_unsaved(SOURCE_EXTENSION);
        Self {
            applied: Vec::new(),
            undone: Vec::new(),
            queued: VecDeque::new(),
            clipboard: None,
            canvas: Canvas::new(),
            editor_config: EditorConfig::default(),
            storage: Box::new(storage),
            encoder: Box::new(encoder),
            source_file,
        }
    }
    #[must_use]
    pub fn with_editor_config(self, editor_config: EditorConfig) -> Self {
        Self {
            editor_config,
            ..self
        }
    }
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
    #[must_use]
    pub fn editor_config(&self) -> &EditorConfig {
        &self.editor_config
    }
    /// Changes that make up the current canvas, oldest first.
    #[must_use]
    pub fn applied(&self) -> &[Change] {
        &self.applied
    }
    #[must_use]
    pub fn queued_changes(&self) -> usize {
        self.queued.len()
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }
    #[must_use]
    pub fn can_paste(&self) -> bool {
        self.clipboard.is_some()
    }
    /// Name of the file the document saves to.
    #[must_use]
    pub fn source_file_name(&self) -> &str {
        self.source_file.name()
    }

    pub fn enqueue(&mut self, command: impl Into<Command>) {
        self.queued.push_back(Change::new(command.into()));
    }
    /// Drop everything not yet handled, returning how many changes were dropped.
    pub fn cancel_queued(&mut self) -> usize {
        let count = self.queued.len();
        self.queued.clear();
        count
    }
    /// Queue every command, then drain the queue.
    /// # Errors
    /// See [`Self::handle_changes`].
    pub fn handle_now(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<(), HistoryError> {
        for command in commands {
            self.enqueue(command);
        }
        self.handle_changes()
    }
    /// Drain the queue in order.
    ///
    /// # Errors
    /// A failing canvas command stops the drain there, is not applied, and is returned. The
    /// remaining changes stay queued.
    ///
    /// A failing atomic group is rolled back and draining continues. The first such failure is
    /// returned once the queue is empty.
    pub fn handle_changes(&mut self) -> Result<(), HistoryError> {
        let mut atomic_failure = None;
        while let Some(change) = self.queued.pop_front() {
            match self.handle(change) {
                Ok(()) => (),
                Err(e @ HistoryError::Atomic(_)) => {
                    if atomic_failure.is_none() {
                        atomic_failure = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        atomic_failure.map_or(Ok(()), Err)
    }

    fn handle(&mut self, change: Change) -> Result<(), HistoryError> {
        log::trace!("Handling command {:?}", change.command);
        match &change.command {
            Command::History(HistoryCommand::Undo) => self.undo(),
            Command::History(HistoryCommand::Redo) => self.redo(),
            Command::File(file) => {
                let result = match file {
                    FileCommand::Save => self.save(),
                    FileCommand::SaveAs => self.save_as(),
                    FileCommand::Open => self.open(),
                    FileCommand::Export {
                        file_type,
                        file_ext,
                    } => self.export(file_type, file_ext),
                };
                if let Err(e) = result {
                    log::warn!("file operation {file:?} failed: {e}");
                }
            }
            Command::Clipboard(ClipboardCommand::Copy { item }) => {
                self.clipboard = Some(item.clone());
            }
            Command::Clipboard(ClipboardCommand::Paste) => {
                if let Some(item) = self.clipboard.take() {
                    for command in item.paste() {
                        self.enqueue(command);
                    }
                }
            }
            Command::Editor(EditorCommand::ChangeConfig { changes }) => {
                self.editor_config.apply(changes.clone());
            }
            Command::Any(AnyCommand::Atomic { commands }) => {
                for command in commands {
                    if let Err(e) = self.canvas.handle(command) {
                        self.rebuild();
                        return Err(HistoryError::Atomic(e));
                    }
                }
                self.applied.push(change);
            }
            Command::Canvas(command) => {
                self.canvas.handle(command)?;
                self.applied.push(change);
            }
        }
        Ok(())
    }
    fn undo(&mut self) {
        let Some(undone) = self.applied.pop() else {
            return;
        };
        self.undone.push(undone);
        self.rebuild();
    }
    /// Redone changes skip ahead of anything already queued.
    fn redo(&mut self) {
        if let Some(redone) = self.undone.pop() {
            self.queued.push_front(redone);
        }
    }
    /// Discard the canvas, queueing every applied change ahead of the existing queue.
    fn rebuild(&mut self) {
        log::debug!(
            "Rebuilding canvas from {} applied changes",
            self.applied.len()
        );
        self.canvas = Canvas::new();
        let mut queued = std::mem::take(&mut self.applied)
            .into_iter()
            .collect::<VecDeque<_>>();
        queued.append(&mut self.queued);
        self.queued = queued;
    }

    /// Write the applied changes to the current file.
    /// # Errors
    /// Storage errors.
    pub fn save(&mut self) -> Result<(), FileError> {
        let data = SourceFile::new(self.canvas.settings(), self.applied.clone()).to_vec()?;
        self.source_file.set_contents(data);
        self.source_file.save()?;
        Ok(())
    }
    /// Switch to a copy of the current file, then save.
    /// # Errors
    /// Storage errors.
    pub fn save_as(&mut self) -> Result<(), FileError> {
        self.source_file = self.source_file.copy()?;
        self.save()
    }
    /// Open a document, discarding all state and queueing its history for replay.
    ///
    /// Nothing changes if the file cannot be read.
    /// # Errors
    /// Storage errors, malformed files, or unsupported versions.
    pub fn open(&mut self) -> Result<(), FileError> {
        let file = self.storage.open_existing(SOURCE_EXTENSION)?;
        let data = SourceFile::from_slice(file.contents())?;
        log::debug!(
            "Opened {} (app version {:?}) with {} changes",
            file.name(),
            data.app_version,
            data.history.len()
        );
        // Only edits are ever saved. Anything else would undo, reopen, or paste on replay.
        let (history, skipped): (VecDeque<_>, VecDeque<_>) = data
            .history
            .into_iter()
            .partition(|change| change.command.is_document_change());
        if !skipped.is_empty() {
            log::warn!(
                "Ignoring {} changes in {} that do not edit the canvas",
                skipped.len(),
                file.name()
            );
        }
        self.source_file = file;
        self.canvas = Canvas::new();
        self.applied.clear();
        self.undone.clear();
        self.queued = history;
        Ok(())
    }
    /// Encode the canvas as it is now into a new file.
    ///
    /// An empty `file_ext` means `.png` for PNG exports.
    /// # Errors
    /// Encoding or storage errors.
    pub fn export(&mut self, file_type: &str, file_ext: &str) -> Result<(), FileError> {
        let file_ext = if file_ext.is_empty() && file_type == PNG_TYPE {
            PNG_EXTENSION
        } else {
            file_ext
        };
        let grid = self.canvas.flat_grid(&[]);
        let data = if self.editor_config.crop_exports {
            self.encoder.encode(file_type, &grid.cropped())?
        } else {
            self.encoder.encode(file_type, &grid)?
        };
        let mut file = self.storage.new_unsaved(file_ext);
        file.set_contents(data);
        file.save()?;
        log::debug!("Exported {}", file.name());
        Ok(())
    }

    /// Collect canvas commands written during the closure into a single queued change. Several
    /// commands are queued as one atomic group.
    pub fn write_with<F, T>(&mut self, write: F) -> T
    where
        F: FnOnce(&mut writer::CommandWriter<'_>) -> T,
    {
        let mut writer = writer::CommandWriter {
            history: self,
            commands: smallvec::SmallVec::new(),
        };
        // The writer's Drop impl does the queueing.
        write(&mut writer)
    }
}

impl<C: Into<Command>> writer::CommandWrite<C> for History {
    fn write(&mut self, command: C) {
        self.enqueue(command);
    }
}
