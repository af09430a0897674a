//! # Shapes
//!
//! The drawable primitives. Every shape is defined relative to its own origin, and knows how to
//! produce its pixels, bounds, and modified copies of itself. Shapes are never mutated once built:
//! edits produce new shapes, and layers share them through [`std::sync::Arc`].

pub mod freeform;
pub mod line;
pub mod rect;

pub use freeform::Freeform;
pub use line::Line;
pub use rect::Rect;

use std::sync::OnceLock;

use crate::blend::{blend, BlendMode};
use crate::color::{Color, Pixel};
use crate::fill::Fill;
use crate::space::{Bounds, Vector2};

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Freeform(Freeform),
    Line(Line),
    Rect(Rect),
}
impl From<Freeform> for Shape {
    fn from(value: Freeform) -> Self {
        Self::Freeform(value)
    }
}
impl From<Line> for Shape {
    fn from(value: Line) -> Self {
        Self::Line(value)
    }
}
impl From<Rect> for Shape {
    fn from(value: Rect) -> Self {
        Self::Rect(value)
    }
}

/// Replacement values for [`Shape::copy`]. `None` keeps the original.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapeOverrides {
    pub mode: Option<BlendMode>,
}

impl Shape {
    #[must_use]
    pub fn mode(&self) -> BlendMode {
        match self {
            Self::Freeform(f) => f.mode,
            Self::Line(l) => l.mode,
            Self::Rect(r) => r.mode,
        }
    }
    /// Inclusive bounds, relative to the shape's origin.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Freeform(f) => f.bounds(),
            Self::Line(l) => l.bounds(),
            Self::Rect(r) => r.bounds(),
        }
    }
    /// Colored pixels relative to the shape's origin. Transparent positions are absent.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        match self {
            Self::Freeform(f) => f.pixels(),
            Self::Line(l) => l.pixels(),
            Self::Rect(r) => r.pixels(),
        }
    }
    #[must_use]
    pub fn is_freeform(&self) -> bool {
        matches!(self, Self::Freeform(_))
    }
    /// Combine with `other`, which sits on top at the same origin.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        basic_merge(self, other, Vector2::ZERO).into()
    }
    /// This shape with `fill` applied at `origin` (relative to the shape's origin), or `None`
    /// if there is nothing there to fill.
    #[must_use]
    pub fn filled(&self, origin: Vector2, fill: &Fill) -> Option<Self> {
        match self {
            Self::Freeform(f) => f.filled(origin, fill).map(Self::from),
            Self::Line(l) => l.filled(origin, fill).map(Self::from),
            Self::Rect(r) => r.filled(origin, fill).map(Self::from),
        }
    }
    #[must_use]
    pub fn copy(&self, overrides: ShapeOverrides) -> Self {
        let mut copy = self.clone();
        if let Some(mode) = overrides.mode {
            match &mut copy {
                Self::Freeform(f) => f.mode = mode,
                Self::Line(l) => l.mode = mode,
                Self::Rect(r) => r.mode = mode,
            }
        }
        copy
    }
}

/// Lazily computed pixels of a procedural shape.
///
/// Never participates in equality or serialization.
#[derive(Clone, Default)]
pub(crate) struct PixelCache(OnceLock<Vec<Pixel>>);
impl PixelCache {
    pub(crate) fn get_or_init(&self, init: impl FnOnce() -> Vec<Pixel>) -> &[Pixel] {
        self.0.get_or_init(init)
    }
}
impl PartialEq for PixelCache {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}
impl std::fmt::Debug for PixelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PixelCache")
    }
}

/// Pixels keyed by position, remembering the order positions were first inserted.
#[derive(Default)]
pub(crate) struct PixelSet {
    pixels: Vec<Option<Pixel>>,
    index: hashbrown::HashMap<Vector2, usize>,
}
impl PixelSet {
    /// Insert `pixel`, resolving against any pixel already at that position.
    /// A `None` resolution removes the position.
    pub(crate) fn insert_with(
        &mut self,
        pixel: Pixel,
        resolve: impl FnOnce(Option<Color>, Color) -> Option<Color>,
    ) {
        match self.index.get(&pixel.pos) {
            Some(&idx) => {
                let prev = self.pixels[idx].map(|p| p.color);
                self.pixels[idx] = resolve(prev, pixel.color).map(|c| Pixel::new(pixel.pos, c));
            }
            None => {
                if let Some(color) = resolve(None, pixel.color) {
                    self.index.insert(pixel.pos, self.pixels.len());
                    self.pixels.push(Some(Pixel::new(pixel.pos, color)));
                }
            }
        }
    }
    pub(crate) fn remove(&mut self, pos: Vector2) {
        if let Some(&idx) = self.index.get(&pos) {
            self.pixels[idx] = None;
        }
    }
    pub(crate) fn into_pixels(self) -> Vec<Pixel> {
        self.pixels.into_iter().flatten().collect()
    }
}

/// Union of `a`'s pixels and `b`'s pixels translated by `offset`, with `b` on top.
///
/// Shared positions resolve with `b`'s blend mode. Blending is already baked into the result, so
/// it is always [`BlendMode::Normal`].
#[must_use]
pub fn basic_merge(a: &Shape, b: &Shape, offset: Vector2) -> Freeform {
    let mode = b.mode();
    let mut set = PixelSet::default();
    let b_pixels = b.pixels().iter().map(|px| px.translate(offset));
    for pixel in a.pixels().iter().copied().chain(b_pixels) {
        set.insert_with(pixel, |prev, top| blend(mode, prev, Some(top)));
    }
    Freeform::from_pixels(set.into_pixels())
}

/// `shape` with every position covered by `mask` (translated by `offset`) removed.
#[must_use]
pub fn mask(shape: &Shape, mask: &Shape, offset: Vector2) -> Freeform {
    let mut set = PixelSet::default();
    for &pixel in shape.pixels() {
        set.insert_with(pixel, |_, color| Some(color));
    }
    for pixel in mask.pixels() {
        set.remove(pixel.pos + offset);
    }
    Freeform::from_pixels(set.into_pixels()).with_mode(shape.mode())
}

/// Split `shape` into the pixels outside of `bounds` and those inside, in that order.
#[must_use]
pub fn cut_area(shape: &Shape, bounds: Bounds) -> (Freeform, Freeform) {
    let (inside, outside): (Vec<Pixel>, Vec<Pixel>) = shape
        .pixels()
        .iter()
        .copied()
        .partition(|px| bounds.contains(px.pos));
    let mode = shape.mode();
    (
        Freeform::from_pixels(outside).with_mode(mode),
        Freeform::from_pixels(inside).with_mode(mode),
    )
}
/// The pixels of `shape` inside `bounds`.
#[must_use]
pub fn copy_area(shape: &Shape, bounds: Bounds) -> Freeform {
    cut_area(shape, bounds).1
}
/// The pixels of `shape` outside `bounds`.
#[must_use]
pub fn delete_area(shape: &Shape, bounds: Bounds) -> Freeform {
    cut_area(shape, bounds).0
}

/// Tight bounds of some pixels, or the zero box if there are none.
pub(crate) fn pixel_bounds(pixels: &[Pixel]) -> Bounds {
    Bounds::of_points(pixels.iter().map(|px| px.pos)).unwrap_or(Bounds::ZERO)
}
