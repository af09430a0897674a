use super::PixelCache;
use crate::blend::BlendMode;
use crate::color::{Color, Pixel};
use crate::fill::Fill;
use crate::grid::Grid;
use crate::space::{v, Bounds, Vector2};
use crate::stroke::Stroke;

/// An axis-aligned rectangle with its top-left corner at the origin, optionally filled and
/// outlined with a one pixel stroke.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    #[serde(default)]
    pub mode: BlendMode,
    size: Vector2,
    #[serde(default)]
    fill: Option<Fill>,
    #[serde(default)]
    stroke: Option<Stroke>,
    /// Phase of patterned fills, relative to the origin.
    #[serde(default)]
    fill_origin: Vector2,
    #[serde(skip)]
    cache: PixelCache,
}

/// Cells of the outline of a `size` rectangle, clockwise from the top-left corner, each exactly once.
fn perimeter(size: Vector2) -> Vec<Vector2> {
    let (w, h) = (size.x, size.y);
    if w <= 0 || h <= 0 {
        return Vec::new();
    }
    let mut cells: Vec<Vector2> = (0..w).map(|x| v(x, 0)).collect();
    if h > 1 {
        cells.extend((1..h).map(|y| v(w - 1, y)));
        if w > 1 {
            cells.extend((0..w - 1).rev().map(|x| v(x, h - 1)));
            cells.extend((1..h - 1).rev().map(|y| v(0, y)));
        }
    }
    cells
}

impl Rect {
    #[must_use]
    pub fn new(size: Vector2, fill: Option<Fill>, stroke: Option<Stroke>) -> Self {
        Self {
            mode: BlendMode::Normal,
            size,
            fill,
            stroke,
            fill_origin: Vector2::ZERO,
            cache: PixelCache::default(),
        }
    }
    #[must_use]
    pub fn with_mode(self, mode: BlendMode) -> Self {
        Self { mode, ..self }
    }
    #[must_use]
    pub fn with_fill_origin(self, fill_origin: Vector2) -> Self {
        Self {
            fill_origin,
            cache: PixelCache::default(),
            ..self
        }
    }
    #[must_use]
    pub fn size(&self) -> Vector2 {
        self.size
    }
    #[must_use]
    pub fn fill(&self) -> Option<&Fill> {
        self.fill.as_ref()
    }
    #[must_use]
    pub fn stroke(&self) -> Option<&Stroke> {
        self.stroke.as_ref()
    }
    #[must_use]
    pub fn fill_origin(&self) -> Vector2 {
        self.fill_origin
    }
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(Vector2::ZERO, self.size - Vector2::ONE)
    }
    /// Fill on every cell, then the stroke along the perimeter with a single linear counter.
    /// A transparent stroke cell erases the fill beneath it.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        self.cache.get_or_init(|| {
            let mut grid = Grid::<Color>::new(self.size, false);
            if let Some(fill) = &self.fill {
                for x in 0..grid.width() {
                    for y in 0..grid.height() {
                        let pos = v(x, y);
                        grid.put(pos, fill.pixel_color(pos - self.fill_origin));
                    }
                }
            }
            if let Some(stroke) = &self.stroke {
                for (linear, pos) in perimeter(self.size).into_iter().enumerate() {
                    grid.put(pos, stroke.pixel_color(pos, linear));
                }
            }
            grid.values().map(|(pos, &color)| Pixel::new(pos, color)).collect()
        })
    }
    /// Replace the stroke if `origin` is on the edge, or the fill if it is strictly inside.
    #[must_use]
    pub fn filled(&self, origin: Vector2, fill: &Fill) -> Option<Self> {
        let bounds = self.bounds();
        if !bounds.contains(origin) {
            return None;
        }
        let on_edge = origin.x == bounds.from.x
            || origin.x == bounds.to.x
            || origin.y == bounds.from.y
            || origin.y == bounds.to.y;
        let (new_fill, new_stroke) = if on_edge {
            (self.fill.clone(), Some(Stroke::from_fill(fill.clone())))
        } else {
            (Some(fill.clone()), self.stroke.clone())
        };
        Some(
            Self::new(self.size, new_fill, new_stroke)
                .with_mode(self.mode)
                .with_fill_origin(self.fill_origin),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use Color::{Black, White};

    #[test]
    fn perimeter_order() {
        assert_eq!(
            perimeter(v(3, 3)),
            vec![
                v(0, 0),
                v(1, 0),
                v(2, 0),
                v(2, 1),
                v(2, 2),
                v(1, 2),
                v(0, 2),
                v(0, 1)
            ]
        );
    }
    #[test]
    fn perimeter_visits_each_cell_once() {
        for size in [v(1, 1), v(1, 4), v(4, 1), v(2, 2), v(5, 3)] {
            let cells = perimeter(size);
            let mut dedup = cells.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(cells.len(), dedup.len(), "{size:?}");
            let expected = if size.x == 1 || size.y == 1 {
                (size.x * size.y) as usize
            } else {
                (2 * (size.x + size.y) - 4) as usize
            };
            assert_eq!(cells.len(), expected, "{size:?}");
        }
        assert!(perimeter(v(0, 3)).is_empty());
    }
    #[test]
    fn fill_then_stroke() {
        let rect = Rect::new(
            v(3, 3),
            Some(Fill::solid(White)),
            Some(Stroke::solid(Black)),
        );
        let pixels = rect.pixels();
        assert_eq!(pixels.len(), 9);
        assert_eq!(
            pixels.iter().filter(|px| px.color == White).count(),
            1
        );
        assert!(pixels.contains(&Pixel::new(v(1, 1), White)));
        assert_eq!(rect.bounds(), Bounds::new(v(0, 0), v(2, 2)));
    }
    #[test]
    fn dotted_stroke_erases_fill() {
        let rect = Rect::new(
            v(3, 3),
            Some(Fill::solid(White)),
            Some(Stroke::dotted("d", Black, 1)),
        );
        // Odd linear positions are transparent: (1,0) (2,1) (1,2) (0,1).
        let pixels = rect.pixels();
        assert_eq!(pixels.len(), 5);
        assert!(!pixels.iter().any(|px| px.pos == v(1, 0)));
        assert!(pixels.contains(&Pixel::new(v(2, 2), Black)));
    }
    #[test]
    fn fill_origin_shifts_pattern() {
        let dither = crate::fill::built_in().swap_remove(2);
        let rect = Rect::new(v(2, 1), Some(dither.clone()), None);
        assert_eq!(rect.pixels(), &[Pixel::new(v(0, 0), Black)]);
        let shifted = Rect::new(v(2, 1), Some(dither), None).with_fill_origin(v(1, 0));
        assert_eq!(shifted.pixels(), &[Pixel::new(v(1, 0), Black)]);
    }
    #[test]
    fn filled_edge_or_interior() {
        let rect = Rect::new(v(4, 4), None, Some(Stroke::solid(Black)));
        let white = Fill::solid(White);

        let interior = rect.filled(v(1, 2), &white).unwrap();
        assert_eq!(interior.fill(), Some(&white));
        assert_eq!(interior.stroke(), Some(&Stroke::solid(Black)));

        let edge = rect.filled(v(3, 1), &white).unwrap();
        assert_eq!(edge.fill(), None);
        assert_eq!(edge.stroke(), Some(&Stroke::from_fill(white.clone())));
        assert!(edge.pixels().iter().all(|px| px.color == White));

        assert_eq!(rect.filled(v(4, 1), &white), None);
    }
}
