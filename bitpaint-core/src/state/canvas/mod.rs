//! # Canvas
//!
//! The ordered stack of layers making up a document, index 0 being the topmost, and the top-level
//! compositor producing the final image.
//!
//! The canvas is only changed through [`commands::Command`]s, so that history can replay it.

pub mod commands;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blend::blend;
use crate::color::Color;
use crate::grid::Grid;
use crate::space::{v, Vector2};
use crate::state::layer::{
    Layer, PositionedShape, ReorderDirection, VerticalPosition, VirtualLayerShapes,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("a layer named {0:?} already exists")]
    NameConflict(String),
    #[error("simulated command processing error")]
    Simulated,
}

/// Persisted alongside the command log.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    pub size: Vector2,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Whether freeform shapes drawn onto freeform shapes are merged into them by default.
    pub merge_freeform: bool,
}
impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            size: v(100, 100),
            looping: false,
            merge_freeform: true,
        }
    }
}
/// A partial [`CanvasSettings`]. Absent fields are left as-is.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettingsChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vector2>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub looping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_freeform: Option<bool>,
}
impl From<CanvasSettings> for CanvasSettingsChanges {
    fn from(value: CanvasSettings) -> Self {
        Self {
            size: Some(value.size),
            looping: Some(value.looping),
            merge_freeform: Some(value.merge_freeform),
        }
    }
}

/// Shapes drawn into the canvas without being part of it, such as a tool's preview.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct VirtualShapes {
    /// The layer to draw into, or `None` for a layer of their own above all others.
    pub layer: Option<String>,
    pub shapes: VirtualLayerShapes,
    /// Indices of the layer's real shapes to leave out, such as one being dragged.
    pub hidden: Vec<usize>,
}

#[derive(Default)]
pub struct Canvas {
    settings: CanvasSettings,
    /// Counter for generated layer names. Never reused.
    layer_counter: u32,
    version: u64,
    layers: Vec<Layer>,
    flat: parking_lot::Mutex<Option<(u64, Arc<Grid<Color>>)>>,
}
impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("settings", &self.settings)
            .field("version", &self.version)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn settings(&self) -> CanvasSettings {
        self.settings
    }
    /// Bumped once per handled command, successful or not.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    #[must_use]
    pub fn top_layer(&self) -> Option<&Layer> {
        self.layers.first()
    }
    #[must_use]
    pub fn bottom_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }
    #[must_use]
    pub fn named_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }
    #[must_use]
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name() == name)
    }
    fn named_layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name() == name)
    }

    /// Apply a command. On error the canvas is left unchanged.
    pub fn handle(&mut self, command: &commands::Command) -> Result<(), CanvasError> {
        use commands::Command;
        let result = match command {
            Command::Error => Err(CanvasError::Simulated),
            Command::AddLayer { name } => self
                .add_layer(name.clone(), VerticalPosition::Top)
                .map(|_| ()),
            Command::AddShape {
                layer_name,
                shape,
                before_index,
                origin,
                merge_freeform,
                mask,
            } => {
                let shape = PositionedShape {
                    shape: shape.clone(),
                    origin: origin.unwrap_or_default(),
                    hidden: false,
                    mask: mask.unwrap_or(false),
                };
                self.add_shape(
                    shape,
                    layer_name.as_deref(),
                    *merge_freeform,
                    before_index.unwrap_or(VerticalPosition::Top),
                )
            }
            Command::HideLayer { name } => {
                if let Some(layer) = self.named_layer_mut(name) {
                    layer.hidden = true;
                }
                Ok(())
            }
            Command::ShowLayer { name } => {
                if let Some(layer) = self.named_layer_mut(name) {
                    layer.hidden = false;
                }
                Ok(())
            }
            Command::MergeLayerDown { name } => self.merge_layer_down(name),
            Command::MergeShapeDown { layer_name, index } => {
                if let Some(layer) = self.named_layer_mut(layer_name) {
                    layer.merge_down(*index);
                }
                Ok(())
            }
            Command::FlattenLayer { name } => {
                if let Some(layer) = self.named_layer_mut(name) {
                    layer.flatten();
                }
                Ok(())
            }
            Command::DeleteLayer { name } => {
                self.layers.retain(|l| l.name() != name);
                Ok(())
            }
            Command::DeleteShape { layer_name, index } => {
                if let Some(layer) = self.named_layer_mut(layer_name) {
                    layer.remove_shape(*index);
                }
                Ok(())
            }
            Command::DuplicateLayer { name } => self.duplicate_layer(name),
            Command::DuplicateShape { layer_name, index } => {
                if let Some(layer) = self.named_layer_mut(layer_name) {
                    if let Some(shape) = layer.shape(*index).cloned() {
                        layer.add_shape(shape, VerticalPosition::Index(index + 1), false);
                    }
                }
                Ok(())
            }
            Command::ReorderLayer { name, direction } => {
                self.reorder_layer(name, *direction);
                Ok(())
            }
            Command::ReorderShape {
                layer_name,
                index,
                direction,
            } => {
                self.reorder_shape(layer_name, *index, *direction);
                Ok(())
            }
            Command::MoveLayer { name, offset } => {
                if let Some(layer) = self.named_layer_mut(name) {
                    layer.origin = layer.origin + *offset;
                }
                Ok(())
            }
            Command::MoveShape {
                layer_name,
                index,
                offset,
            } => {
                if let Some(layer) = self.named_layer_mut(layer_name) {
                    layer.move_shape(*index, *offset);
                }
                Ok(())
            }
            Command::RenameLayer {
                layer_name,
                new_name,
            } => self.rename_layer(layer_name, new_name),
            Command::Configure { settings } => {
                self.configure(*settings);
                Ok(())
            }
        };
        self.version += 1;
        result
    }

    fn add_layer(
        &mut self,
        name: Option<String>,
        to: VerticalPosition,
    ) -> Result<&mut Layer, CanvasError> {
        let name = match name {
            Some(name) if self.named_layer(&name).is_some() => {
                return Err(CanvasError::NameConflict(name));
            }
            Some(name) => name,
            // Generated names skip over any the user took.
            None => loop {
                self.layer_counter += 1;
                let name = format!("Layer {}", self.layer_counter);
                if self.named_layer(&name).is_none() {
                    break name;
                }
            },
        };
        let idx = match to {
            VerticalPosition::Top => 0,
            VerticalPosition::Bottom => self.layers.len(),
            VerticalPosition::Index(idx) => idx.min(self.layers.len()),
        };
        self.layers.insert(idx, Layer::new(name));
        Ok(&mut self.layers[idx])
    }
    fn add_shape(
        &mut self,
        shape: PositionedShape,
        layer_name: Option<&str>,
        merge_freeform: Option<bool>,
        to: VerticalPosition,
    ) -> Result<(), CanvasError> {
        let merge_freeform = merge_freeform.unwrap_or(self.settings.merge_freeform);
        let layer = match layer_name {
            Some(name) => match self.layer_index(name) {
                Some(idx) => &mut self.layers[idx],
                None => self.add_layer(Some(name.to_owned()), VerticalPosition::Top)?,
            },
            None => self.add_layer(None, VerticalPosition::Top)?,
        };
        layer.add_shape(shape, to, merge_freeform);
        Ok(())
    }
    fn rename_layer(&mut self, old: &str, new: &str) -> Result<(), CanvasError> {
        if self.named_layer(new).is_some() {
            return Err(CanvasError::NameConflict(new.to_owned()));
        }
        if let Some(layer) = self.named_layer_mut(old) {
            layer.set_name(new.to_owned());
        }
        Ok(())
    }
    fn duplicate_layer(&mut self, name: &str) -> Result<(), CanvasError> {
        let Some(idx) = self.layer_index(name) else {
            return Ok(());
        };
        let original = &self.layers[idx];
        let (hidden, origin, shapes) = (
            original.hidden,
            original.origin,
            original.shapes().to_vec(),
        );
        let copy = self.add_layer(Some(format!("Copy of {name}")), VerticalPosition::Index(idx))?;
        copy.hidden = hidden;
        copy.origin = origin;
        for shape in shapes {
            copy.add_shape(shape, VerticalPosition::Bottom, false);
        }
        Ok(())
    }
    fn reorder_layer(&mut self, name: &str, direction: ReorderDirection) {
        let Some(idx) = self.layer_index(name) else {
            return;
        };
        let other = match direction {
            ReorderDirection::Up => idx.checked_sub(1),
            ReorderDirection::Down => Some(idx + 1).filter(|&o| o < self.layers.len()),
        };
        if let Some(other) = other {
            self.layers.swap(idx, other);
        }
    }
    /// Move a shape within its layer, or across into the neighbouring layer at a boundary.
    fn reorder_shape(&mut self, layer_name: &str, index: usize, direction: ReorderDirection) {
        let Some(layer_idx) = self.layer_index(layer_name) else {
            return;
        };
        let len = self.layers[layer_idx].len();
        let (target_idx, from, to) = match direction {
            ReorderDirection::Up if index > 0 => {
                self.layers[layer_idx].reorder_shape(index, direction);
                return;
            }
            ReorderDirection::Up => match layer_idx.checked_sub(1) {
                Some(above) => (above, VerticalPosition::Top, VerticalPosition::Bottom),
                None => return,
            },
            ReorderDirection::Down if index + 1 != len => {
                self.layers[layer_idx].reorder_shape(index, direction);
                return;
            }
            ReorderDirection::Down if layer_idx + 1 < self.layers.len() => {
                (layer_idx + 1, VerticalPosition::Bottom, VerticalPosition::Top)
            }
            ReorderDirection::Down => return,
        };
        let source_origin = self.layers[layer_idx].origin;
        let Some(mut shape) = self.layers[layer_idx].remove_shape(from) else {
            return;
        };
        let target = &mut self.layers[target_idx];
        shape.origin = shape.origin + (source_origin - target.origin);
        target.add_shape(shape, to, false);
    }
    fn merge_layer_down(&mut self, name: &str) -> Result<(), CanvasError> {
        let Some(idx) = self.layer_index(name) else {
            return Ok(());
        };
        if idx + 1 >= self.layers.len() {
            return Ok(());
        }
        let target_name = self.layers[idx + 1].name().to_owned();
        // The merged layer composites onto the ones below the way the target did.
        let mode = if self.layers[idx + 1].is_empty() {
            self.layers[idx].blend_mode()
        } else {
            self.layers[idx + 1].blend_mode()
        };
        self.layers[idx].flatten();
        // Flattened first so the source blends over the target's whole raster.
        self.layers[idx + 1].flatten();
        if !self.layers[idx].is_empty() {
            self.reorder_shape(name, 0, ReorderDirection::Down);
        }
        self.layers.remove(idx);
        self.layers[idx].flatten();
        self.layers[idx].set_lone_mode(mode);
        self.rename_layer(&target_name, name)
    }
    fn configure(&mut self, changes: CanvasSettingsChanges) {
        if let Some(size) = changes.size {
            self.settings.size = size;
        }
        if let Some(looping) = changes.looping {
            self.settings.looping = looping;
        }
        if let Some(merge_freeform) = changes.merge_freeform {
            self.settings.merge_freeform = merge_freeform;
        }
    }

    /// Composite every visible layer, bottom to top, into a canvas sized grid.
    ///
    /// Each layer is stamped with the blend mode of its topmost drawn shape. Memoized per
    /// version while there are no virtual shapes.
    #[must_use]
    pub fn flat_grid(&self, virtuals: &[VirtualShapes]) -> Arc<Grid<Color>> {
        if virtuals.is_empty() {
            let mut cache = self.flat.lock();
            if let Some((version, grid)) = cache.as_ref() {
                if *version == self.version {
                    return grid.clone();
                }
            }
            let grid = Arc::new(self.composite(&[]));
            *cache = Some((self.version, grid.clone()));
            return grid;
        }
        Arc::new(self.composite(virtuals))
    }
    fn composite(&self, virtuals: &[VirtualShapes]) -> Grid<Color> {
        let mut by_layer: BTreeMap<&str, (VirtualLayerShapes, Vec<usize>)> = BTreeMap::new();
        let mut unlayered = Vec::new();
        for entry in virtuals {
            match &entry.layer {
                Some(name) => {
                    let (layer, hidden) = by_layer.entry(name.as_str()).or_default();
                    for (idx, shapes) in &entry.shapes {
                        layer.entry(*idx).or_default().extend(shapes.iter().cloned());
                    }
                    hidden.extend_from_slice(&entry.hidden);
                }
                None => unlayered.extend(entry.shapes.values().flatten().cloned()),
            }
        }
        let virtual_layer = (!unlayered.is_empty()).then(|| Layer::with_shapes("", unlayered));

        let mut grid = Grid::new(self.settings.size, self.settings.looping);
        for layer in virtual_layer.iter().chain(&self.layers).rev() {
            if layer.hidden {
                continue;
            }
            let raster = match by_layer.get(layer.name()) {
                Some((shapes, hidden)) => Arc::new(layer.preview_grid(shapes, hidden)),
                None => layer.flat_grid(&VirtualLayerShapes::new()),
            };
            let mode = layer.blend_mode();
            let offset = raster.offset + layer.origin;
            for (pos, &color) in raster.grid.values() {
                grid.put_with(pos + offset, Some(color), |top, bottom| {
                    blend(mode, bottom.copied(), top)
                });
            }
        }
        grid
    }
}
