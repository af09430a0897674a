use std::sync::Arc;

use super::CanvasSettingsChanges;
use crate::space::Vector2;
use crate::state::layer::{PositionedShape, ReorderDirection, VerticalPosition};
use crate::state::shape::Shape;

/// Every way the canvas can be changed.
///
/// Commands naming a missing layer or shape do nothing. Layer name conflicts and the
/// test-only [`Command::Error`] fail.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Always fails, to exercise error paths.
    Error,
    AddLayer {
        /// Generated if absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Add a shape, creating the layer if needed. Without a layer name, a new layer is made.
    AddShape {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layer_name: Option<String>,
        shape: Arc<Shape>,
        /// Defaults to the top.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before_index: Option<VerticalPosition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<Vector2>,
        /// Defaults to the canvas setting.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        merge_freeform: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mask: Option<bool>,
    },
    HideLayer {
        name: String,
    },
    ShowLayer {
        name: String,
    },
    /// Collapse a layer into the one beneath it, which takes over its name.
    MergeLayerDown {
        name: String,
    },
    MergeShapeDown {
        layer_name: String,
        index: usize,
    },
    FlattenLayer {
        name: String,
    },
    DeleteLayer {
        name: String,
    },
    DeleteShape {
        layer_name: String,
        index: VerticalPosition,
    },
    DuplicateLayer {
        name: String,
    },
    DuplicateShape {
        layer_name: String,
        index: usize,
    },
    ReorderLayer {
        name: String,
        direction: ReorderDirection,
    },
    /// Shapes moved past the end of their layer move into the neighbouring layer.
    ReorderShape {
        layer_name: String,
        index: usize,
        direction: ReorderDirection,
    },
    MoveLayer {
        name: String,
        offset: Vector2,
    },
    MoveShape {
        layer_name: String,
        index: usize,
        offset: Vector2,
    },
    RenameLayer {
        layer_name: String,
        new_name: String,
    },
    Configure {
        settings: CanvasSettingsChanges,
    },
}

impl Command {
    /// Add `shape` to the top of `layer_name` with default options.
    #[must_use]
    pub fn add_shape(layer_name: impl Into<String>, shape: PositionedShape) -> Self {
        Self::AddShape {
            layer_name: Some(layer_name.into()),
            shape: shape.shape,
            before_index: None,
            origin: Some(shape.origin),
            merge_freeform: None,
            mask: shape.mask.then_some(true),
        }
    }
}

/// Swap the shape at `index` for `shape`, as one atomic change.
#[must_use]
pub fn replace_shape(
    layer_name: impl Into<String>,
    index: usize,
    shape: PositionedShape,
) -> crate::commands::Command {
    let layer_name = layer_name.into();
    crate::commands::Command::atomic(vec![
        Command::AddShape {
            layer_name: Some(layer_name.clone()),
            shape: shape.shape,
            before_index: Some(VerticalPosition::Index(index)),
            origin: Some(shape.origin),
            merge_freeform: Some(false),
            mask: Some(shape.mask),
        },
        Command::DeleteShape {
            layer_name,
            index: VerticalPosition::Index(index + 1),
        },
    ])
}
