use hashbrown::{HashMap, HashSet};

use super::{basic_merge, pixel_bounds, Shape};
use crate::blend::BlendMode;
use crate::color::{Color, Pixel};
use crate::fill::Fill;
use crate::space::{v, Bounds, Vector2};

/// Flood fill gives up after this many frontier generations.
const FILL_ITERATION_LIMIT: usize = 10_000;
const FILL_DIRECTIONS: [Vector2; 4] = [v(1, 0), v(0, 1), v(-1, 0), v(0, -1)];

/// An explicit list of pixels.
#[derive(Clone, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Freeform {
    #[serde(default)]
    pub mode: BlendMode,
    pixels: Vec<Pixel>,
}

impl Freeform {
    #[must_use]
    pub fn from_pixels(pixels: Vec<Pixel>) -> Self {
        Self {
            mode: BlendMode::Normal,
            pixels,
        }
    }
    /// Every point in one color.
    #[must_use]
    pub fn from_points(points: &[Vector2], color: Color) -> Self {
        Self::from_pixels(points.iter().map(|&pos| Pixel::new(pos, color)).collect())
    }
    /// Bake any shape into its pixels, keeping its mode.
    #[must_use]
    pub fn from_shape(shape: &Shape) -> Self {
        match shape {
            Shape::Freeform(f) => f.clone(),
            other => Self::from_pixels(other.pixels().to_vec()).with_mode(other.mode()),
        }
    }
    #[must_use]
    pub fn with_mode(self, mode: BlendMode) -> Self {
        Self { mode, ..self }
    }
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        pixel_bounds(&self.pixels)
    }
    /// Bounded flood fill from `origin`.
    ///
    /// Spreads over 4-neighbours having the same color (or lack thereof) as `origin`, within the
    /// shape's bounds. When filling empty space, touching the outermost ring of the bounds on an
    /// empty cell means the region is not enclosed and `None` is returned.
    #[must_use]
    pub fn filled(&self, origin: Vector2, fill: &Fill) -> Option<Self> {
        let bounds = self.bounds();
        let inner = bounds.shrink();
        let colors: HashMap<Vector2, Color> =
            self.pixels.iter().map(|px| (px.pos, px.color)).collect();
        let color_at = |pos: Vector2| {
            if bounds.contains(pos) {
                colors.get(&pos).copied()
            } else {
                None
            }
        };
        let target = color_at(origin);

        let mut points = Vec::new();
        let mut considered = HashSet::new();
        let mut frontier = vec![origin];
        for _ in 0..FILL_ITERATION_LIMIT {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            let mut queued = HashSet::new();
            for point in std::mem::take(&mut frontier) {
                considered.insert(point);
                if color_at(point) != target {
                    continue;
                }
                points.push(point);
                for dir in FILL_DIRECTIONS {
                    let neighbour = point + dir;
                    if bounds.contains(neighbour)
                        && !considered.contains(&neighbour)
                        && queued.insert(neighbour)
                    {
                        next.push(neighbour);
                    }
                    if target.is_none()
                        && !inner.contains(neighbour)
                        && color_at(neighbour).is_none()
                    {
                        // Leaked out through the edge.
                        return None;
                    }
                }
            }
            frontier = next;
        }
        if points.is_empty() {
            return None;
        }

        let fill_pixels = points
            .into_iter()
            .filter_map(|pos| Some(Pixel::new(pos, fill.pixel_color(pos)?)))
            .collect();
        let merged = basic_merge(
            &Shape::Freeform(self.clone()),
            &Shape::Freeform(Self::from_pixels(fill_pixels)),
            Vector2::ZERO,
        );
        Some(merged.with_mode(self.mode))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::space::Bounds;

    /// A closed square outline, `size` wide, with its corner at the origin.
    fn square(size: i32) -> Freeform {
        let mut points = Vec::new();
        for i in 0..size {
            points.extend([v(i, 0), v(i, size - 1), v(0, i), v(size - 1, i)]);
        }
        points.sort();
        points.dedup();
        Freeform::from_points(&points, Color::Black)
    }

    #[test]
    fn bounds_of_pixels() {
        let f = Freeform::from_points(&[v(2, 3), v(-1, 5)], Color::White);
        assert_eq!(f.bounds(), Bounds::new(v(-1, 3), v(2, 5)));
        assert_eq!(Freeform::default().bounds(), Bounds::ZERO);
    }
    #[test]
    fn fill_enclosed_hole() {
        let outline = square(5);
        let before = outline.pixels().len();
        let filled = outline
            .filled(v(2, 2), &Fill::solid(Color::White))
            .expect("region is enclosed");
        // 3x3 interior.
        assert_eq!(filled.pixels().len(), before + 9);
        assert!(filled
            .pixels()
            .contains(&Pixel::new(v(1, 1), Color::White)));
        assert!(filled
            .pixels()
            .contains(&Pixel::new(v(0, 0), Color::Black)));
    }
    #[test]
    fn fill_unenclosed_fails() {
        let mut points: Vec<_> = square(5).pixels().iter().map(|px| px.pos).collect();
        points.retain(|&p| p != v(2, 0));
        let leaky = Freeform::from_points(&points, Color::Black);
        assert_eq!(leaky.filled(v(2, 2), &Fill::solid(Color::White)), None);
        // Outside of the shape entirely.
        assert_eq!(square(5).filled(v(9, 9), &Fill::solid(Color::White)), None);
    }
    #[test]
    fn fill_recolors_region() {
        let mut pixels = square(4).pixels().to_vec();
        pixels.extend([v(1, 1), v(2, 1), v(1, 2), v(2, 2)].map(|p| Pixel::new(p, Color::White)));
        let shape = Freeform::from_pixels(pixels);
        let filled = shape.filled(v(0, 0), &Fill::solid(Color::White)).unwrap();
        // Whole outline is recolored, interior untouched.
        assert!(filled.pixels().iter().all(|px| px.color == Color::White));
        assert_eq!(filled.pixels().len(), 16);
    }
    #[test]
    fn fill_transparent_pattern_cells_are_dropped() {
        let fill = crate::fill::built_in().swap_remove(2);
        let filled = square(5).filled(v(2, 2), &fill).unwrap();
        // Checkerboard over a 3x3 interior, (1,1) is black in the dither.
        assert_eq!(filled.pixels().len(), 16 + 5);
    }
    #[test]
    fn from_shape_keeps_mode() {
        let line = crate::state::shape::Line::new(v(2, 0), crate::stroke::Stroke::solid(Color::Black))
            .with_mode(BlendMode::Invert);
        let f = Freeform::from_shape(&line.into());
        assert_eq!(f.mode, BlendMode::Invert);
        assert_eq!(f.pixels().len(), 3);
    }
}
