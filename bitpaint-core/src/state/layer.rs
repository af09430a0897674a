//! # Layer
//!
//! An ordered stack of positioned shapes, index 0 being the topmost. Layers own the algorithms that
//! collapse their stack: merging one shape into the next, masking, and rasterizing the whole stack.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blend::{blend, BlendMode};
use crate::color::Color;
use crate::grid::Grid;
use crate::space::{Bounds, Vector2};
use crate::state::shape::{self, Shape, ShapeOverrides};

/// A shape placed within a layer.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct PositionedShape {
    pub shape: Arc<Shape>,
    /// Relative to the layer's origin.
    #[serde(default)]
    pub origin: Vector2,
    #[serde(default)]
    pub hidden: bool,
    /// Consumed by the shape immediately below, removing every position it covers.
    #[serde(default)]
    pub mask: bool,
}
impl PositionedShape {
    #[must_use]
    pub fn new(shape: impl Into<Shape>, origin: Vector2) -> Self {
        Self {
            shape: Arc::new(shape.into()),
            origin,
            hidden: false,
            mask: false,
        }
    }
    #[must_use]
    pub fn masking(self) -> Self {
        Self { mask: true, ..self }
    }
    /// Shape bounds, translated to the layer's space.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.shape.bounds().translate(self.origin)
    }
}

/// A place in a stack: either end, or before the item at an index.
#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(from = "VerticalPositionRepr", into = "VerticalPositionRepr")]
pub enum VerticalPosition {
    Top,
    Bottom,
    Index(usize),
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum VerticalPositionRepr {
    Index(usize),
    Named(NamedPosition),
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum NamedPosition {
    Top,
    Bottom,
}
impl From<VerticalPositionRepr> for VerticalPosition {
    fn from(value: VerticalPositionRepr) -> Self {
        match value {
            VerticalPositionRepr::Index(idx) => Self::Index(idx),
            VerticalPositionRepr::Named(NamedPosition::Top) => Self::Top,
            VerticalPositionRepr::Named(NamedPosition::Bottom) => Self::Bottom,
        }
    }
}
impl From<VerticalPosition> for VerticalPositionRepr {
    fn from(value: VerticalPosition) -> Self {
        match value {
            VerticalPosition::Index(idx) => Self::Index(idx),
            VerticalPosition::Top => Self::Named(NamedPosition::Top),
            VerticalPosition::Bottom => Self::Named(NamedPosition::Bottom),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::AsRefStr, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// Towards index 0.
    Up,
    Down,
}

/// Extra shapes drawn into a layer's raster without being part of it, keyed by the index of the
/// real shape they sit above. Keys past the end land at the bottom.
pub type VirtualLayerShapes = BTreeMap<usize, Vec<PositionedShape>>;

/// A layer's stack collapsed into one grid. `offset` is the layer-space position of cell `(0, 0)`.
#[derive(Clone, PartialEq, Debug)]
pub struct LayerRaster {
    pub grid: Grid<Color>,
    pub offset: Vector2,
}

pub struct Layer {
    name: String,
    pub hidden: bool,
    pub origin: Vector2,
    shapes: Vec<PositionedShape>,
    /// Bumped on every change to `shapes`.
    revision: u64,
    raster: parking_lot::Mutex<Option<(u64, Arc<LayerRaster>)>>,
}
impl Clone for Layer {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            hidden: self.hidden,
            origin: self.origin,
            shapes: self.shapes.clone(),
            revision: self.revision,
            raster: parking_lot::Mutex::new(self.raster.lock().clone()),
        }
    }
}
impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("origin", &self.origin)
            .field("shapes", &self.shapes)
            .finish_non_exhaustive()
    }
}

impl Layer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_shapes(name, Vec::new())
    }
    #[must_use]
    pub fn with_shapes(name: impl Into<String>, shapes: Vec<PositionedShape>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            origin: Vector2::ZERO,
            shapes,
            revision: 0,
            raster: parking_lot::Mutex::new(None),
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Uniqueness is the canvas' concern.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
    #[must_use]
    pub fn shapes(&self) -> &[PositionedShape] {
        &self.shapes
    }
    #[must_use]
    pub fn shape(&self, index: usize) -> Option<&PositionedShape> {
        self.shapes.get(index)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
    #[must_use]
    pub fn top_shape(&self) -> Option<&PositionedShape> {
        self.shapes.first()
    }
    #[must_use]
    pub fn bottom_shape(&self) -> Option<&PositionedShape> {
        self.shapes.last()
    }
    fn touch(&mut self) {
        self.revision += 1;
    }
    fn shape_mut(&mut self, index: usize) -> Option<&mut PositionedShape> {
        self.touch();
        self.shapes.get_mut(index)
    }
    pub fn hide_shape(&mut self, index: usize) {
        if let Some(shape) = self.shape_mut(index) {
            shape.hidden = true;
        }
    }
    pub fn show_shape(&mut self, index: usize) {
        if let Some(shape) = self.shape_mut(index) {
            shape.hidden = false;
        }
    }
    pub fn move_shape(&mut self, index: usize, offset: Vector2) {
        if let Some(shape) = self.shape_mut(index) {
            shape.origin = shape.origin + offset;
        }
    }
    /// The first shape, from the top, whose bounds contain `pos` (in layer space).
    #[must_use]
    pub fn top_shape_at(&self, pos: Vector2) -> Option<(usize, &PositionedShape)> {
        self.shapes
            .iter()
            .enumerate()
            .find(|(_, shape)| shape.bounds().contains(pos))
    }
    /// Insert a shape. An index past the end is ignored.
    ///
    /// With `merge_freeform`, a freeform landing directly above another freeform is merged into it.
    pub fn add_shape(
        &mut self,
        shape: PositionedShape,
        to: VerticalPosition,
        merge_freeform: bool,
    ) {
        let before = match to {
            VerticalPosition::Top => 0,
            VerticalPosition::Bottom => self.shapes.len(),
            VerticalPosition::Index(idx) => idx,
        };
        if before > self.shapes.len() {
            return;
        }
        self.touch();
        self.shapes.insert(before, shape);
        let mergeable = |idx: usize| self.shapes.get(idx).is_some_and(|s| s.shape.is_freeform());
        if merge_freeform && mergeable(before) && mergeable(before + 1) {
            self.merge_down(before);
        }
    }
    pub fn remove_shape(&mut self, from: VerticalPosition) -> Option<PositionedShape> {
        let idx = match from {
            VerticalPosition::Top => 0,
            VerticalPosition::Bottom => self.shapes.len().checked_sub(1)?,
            VerticalPosition::Index(idx) => idx,
        };
        if idx >= self.shapes.len() {
            return None;
        }
        self.touch();
        Some(self.shapes.remove(idx))
    }
    /// Swap with a neighbour. `false` if already at that end of the stack.
    pub fn reorder_shape(&mut self, index: usize, direction: ReorderDirection) -> bool {
        let other = match direction {
            ReorderDirection::Up => index.checked_sub(1),
            ReorderDirection::Down => Some(index + 1),
        };
        match other {
            Some(other) if other < self.shapes.len() && index < self.shapes.len() => {
                self.touch();
                self.shapes.swap(index, other);
                true
            }
            _ => false,
        }
    }
    /// Combine the shape at `index` into the one below it, which keeps its own origin and flags.
    pub fn merge_down(&mut self, index: usize) {
        if index + 1 >= self.shapes.len() {
            return;
        }
        self.touch();
        let source = self.shapes.remove(index);
        let target = &mut self.shapes[index];
        let offset = source.origin - target.origin;
        let merged = if source.mask {
            shape::mask(&target.shape, &source.shape, offset)
        } else {
            shape::basic_merge(&target.shape, &source.shape, offset)
        };
        target.shape = Arc::new(merged.into());
    }
    /// Merge everything down into a single shape.
    ///
    /// The layer keeps its [`Self::blend_mode`], which only matters once composited onto other
    /// layers.
    pub fn flatten(&mut self) {
        let mode = self.blend_mode();
        while self.shapes.len() > 1 {
            self.merge_down(0);
        }
        self.set_lone_mode(mode);
    }
    /// Restamp a single remaining shape with `mode`. A lone shape rasterizes the same in any mode.
    pub(crate) fn set_lone_mode(&mut self, mode: BlendMode) {
        if let [only] = self.shapes.as_mut_slice() {
            if only.shape.mode() != mode {
                only.shape = Arc::new(only.shape.copy(ShapeOverrides { mode: Some(mode) }));
                self.revision += 1;
            }
        }
    }
    /// Bounds of every shape in layer space, or `None` if there are none.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        bounds_of(self.shapes.iter())
    }
    /// Mode used when compositing this layer onto the ones below: that of its topmost drawn shape.
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.shapes
            .iter()
            .find(|s| !s.hidden && !s.mask)
            .map_or(BlendMode::Normal, |s| s.shape.mode())
    }
    /// Rasterize the stack, with `virtuals` interleaved. Memoized while there are no virtual shapes.
    #[must_use]
    pub fn flat_grid(&self, virtuals: &VirtualLayerShapes) -> Arc<LayerRaster> {
        if virtuals.is_empty() {
            let mut cache = self.raster.lock();
            if let Some((revision, raster)) = cache.as_ref() {
                if *revision == self.revision {
                    return raster.clone();
                }
            }
            let raster = Arc::new(rasterize(self.shapes.iter()));
            *cache = Some((self.revision, raster.clone()));
            return raster;
        }
        Arc::new(self.preview_grid(virtuals, &[]))
    }
    /// Rasterize the stack with `virtuals` interleaved and the shapes at `hidden` left out. Never memoized.
    #[must_use]
    pub fn preview_grid(&self, virtuals: &VirtualLayerShapes, hidden: &[usize]) -> LayerRaster {
        let last = virtuals
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
            .max(self.shapes.len());
        let empty = Vec::new();
        let entries = (0..=last).flat_map(|idx| {
            virtuals
                .get(&idx)
                .unwrap_or(&empty)
                .iter()
                .chain(self.shapes.get(idx).filter(|_| !hidden.contains(&idx)))
        });
        rasterize(entries)
    }
}

fn bounds_of<'a>(shapes: impl Iterator<Item = &'a PositionedShape>) -> Option<Bounds> {
    shapes
        .map(PositionedShape::bounds)
        .reduce(|a, b| a.combine(&b))
}

/// Apply masks to the shapes beneath them, then blend bottom to top.
///
/// Consecutive masks chain the same way [`Layer::merge_down`] would combine them. Hidden entries
/// take no part at all.
fn rasterize<'a>(entries: impl Iterator<Item = &'a PositionedShape> + Clone) -> LayerRaster {
    let Some(bounds) = bounds_of(entries.clone()) else {
        return LayerRaster {
            grid: Grid::new(Vector2::ZERO, false),
            offset: Vector2::ZERO,
        };
    };

    let mut pending_mask: Option<PositionedShape> = None;
    let mut drawn = Vec::new();
    for entry in entries.filter(|e| !e.hidden) {
        let masked = match pending_mask.take() {
            Some(mask) => {
                let shape = shape::mask(&entry.shape, &mask.shape, mask.origin - entry.origin);
                PositionedShape {
                    shape: Arc::new(shape.into()),
                    ..entry.clone()
                }
            }
            None => entry.clone(),
        };
        if masked.mask {
            pending_mask = Some(masked);
        } else {
            drawn.push(masked);
        }
    }

    let offset = bounds.from;
    let mut grid = Grid::new(bounds.size(), false);
    for entry in drawn.iter().rev() {
        let mode = entry.shape.mode();
        for pixel in entry.shape.pixels() {
            grid.put_with(
                pixel.pos + entry.origin - offset,
                Some(pixel.color),
                |top, bottom| blend(mode, bottom.copied(), top),
            );
        }
    }
    LayerRaster { grid, offset }
}
