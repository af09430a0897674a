//! # State
//!
//! Everything that makes up a document, from individual shapes up to the whole canvas, plus the
//! editor's own configuration.

pub mod canvas;
pub mod editor;
pub mod layer;
pub mod shape;

pub use canvas::{Canvas, CanvasError, CanvasSettings};
pub use editor::EditorConfig;
pub use layer::{Layer, PositionedShape};
pub use shape::Shape;
