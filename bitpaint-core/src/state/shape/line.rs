use super::{pixel_bounds, PixelCache};
use crate::blend::BlendMode;
use crate::color::Pixel;
use crate::fill::Fill;
use crate::space::{Bounds, Vector2};
use crate::stroke::Stroke;

/// A one pixel wide straight line from the origin to `vector`, inclusive.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct Line {
    #[serde(default)]
    pub mode: BlendMode,
    vector: Vector2,
    stroke: Stroke,
    #[serde(skip)]
    cache: PixelCache,
}

impl Line {
    #[must_use]
    pub fn new(vector: Vector2, stroke: Stroke) -> Self {
        Self {
            mode: BlendMode::Normal,
            vector,
            stroke,
            cache: PixelCache::default(),
        }
    }
    #[must_use]
    pub fn with_mode(self, mode: BlendMode) -> Self {
        Self { mode, ..self }
    }
    #[must_use]
    pub fn vector(&self) -> Vector2 {
        self.vector
    }
    #[must_use]
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }
    /// Bounds of the colored pixels. A fully transparent line has the zero box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        pixel_bounds(self.pixels())
    }
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        self.cache.get_or_init(|| {
            Vector2::ZERO
                .raster_line(self.vector)
                .into_iter()
                .enumerate()
                .filter_map(|(i, pos)| Some(Pixel::new(pos, self.stroke.pixel_color(pos, i)?)))
                .collect()
        })
    }
    /// Restroke with `fill`, if `origin` is one of the line's pixels.
    #[must_use]
    pub fn filled(&self, origin: Vector2, fill: &Fill) -> Option<Self> {
        self.pixels().iter().find(|px| px.pos == origin)?;
        Some(Self::new(self.vector, Stroke::from_fill(fill.clone())).with_mode(self.mode))
    }
}
