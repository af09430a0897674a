//! # Stroke
//!
//! Strokes color the outlines of shapes. Unlike fills they also see the *linear* position of a
//! pixel, its index along the outline starting from zero for each shape, so patterns can follow
//! the line rather than the plane.

use crate::color::Color;
use crate::fill::Fill;
use crate::grid::Grid;
use crate::space::Vector2;
use crate::util::floor_mod_len;

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Stroke {
    Solid {
        name: String,
        color: Color,
    },
    /// Colored by linear position, repeating `pattern`.
    LinePattern {
        name: String,
        pattern: Vec<Option<Color>>,
    },
    /// Colored by position in space, like a patterned [`Fill`].
    GridPattern {
        name: String,
        #[serde(deserialize_with = "crate::fill::looping_grid")]
        grid: Grid<Color>,
    },
    FromFill {
        fill: Fill,
    },
}

impl Stroke {
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self::Solid {
            name: color.name().to_owned(),
            color,
        }
    }
    #[must_use]
    pub fn line_pattern(name: impl Into<String>, pattern: Vec<Option<Color>>) -> Self {
        Self::LinePattern {
            name: name.into(),
            pattern,
        }
    }
    #[must_use]
    pub fn grid_pattern(name: impl Into<String>, mut grid: Grid<Color>) -> Self {
        grid.set_looping(true);
        Self::GridPattern {
            name: name.into(),
            grid,
        }
    }
    /// `length` pixels of `color` followed by `spacing` transparent pixels, repeating.
    #[must_use]
    pub fn dashed(name: impl Into<String>, color: Color, length: usize, spacing: usize) -> Self {
        let pattern = std::iter::repeat(Some(color))
            .take(length)
            .chain(std::iter::repeat(None).take(spacing))
            .collect();
        Self::line_pattern(name, pattern)
    }
    #[must_use]
    pub fn dotted(name: impl Into<String>, color: Color, spacing: usize) -> Self {
        Self::dashed(name, color, 1, spacing)
    }
    #[must_use]
    pub fn from_fill(fill: Fill) -> Self {
        Self::FromFill { fill }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Solid { name, .. }
            | Self::LinePattern { name, .. }
            | Self::GridPattern { name, .. } => name,
            Self::FromFill { fill } => fill.name(),
        }
    }
    /// Color of the pixel at `pos`, which is the `linear`th pixel along the outline.
    #[must_use]
    pub fn pixel_color(&self, pos: Vector2, linear: usize) -> Option<Color> {
        match self {
            Self::Solid { color, .. } => Some(*color),
            Self::LinePattern { pattern, .. } => {
                let idx = floor_mod_len(i64::try_from(linear).ok()?, pattern.len())?;
                pattern[idx]
            }
            Self::GridPattern { grid, .. } => grid.get(pos).copied(),
            Self::FromFill { fill } => fill.pixel_color(pos),
        }
    }
}

/// Strokes offered to every document.
#[must_use]
pub fn built_in() -> Vec<Stroke> {
    vec![
        Stroke::solid(Color::Black),
        Stroke::solid(Color::White),
        Stroke::dotted("Black dotted 1", Color::Black, 1),
        Stroke::dotted("White dotted 1", Color::White, 1),
        Stroke::dashed("Black dashed 2/2", Color::Black, 2, 2),
        Stroke::dashed("White dashed 2/2", Color::White, 2, 2),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::space::v;
    #[test]
    fn dashes_follow_the_line() {
        let stroke = Stroke::dashed("d", Color::Black, 2, 1);
        let colors: Vec<_> = (0..6).map(|i| stroke.pixel_color(v(0, 0), i)).collect();
        assert_eq!(
            colors,
            vec![
                Some(Color::Black),
                Some(Color::Black),
                None,
                Some(Color::Black),
                Some(Color::Black),
                None
            ]
        );
    }
    #[test]
    fn empty_line_pattern_is_transparent() {
        let stroke = Stroke::line_pattern("empty", vec![]);
        assert_eq!(stroke.pixel_color(v(0, 0), 3), None);
    }
    #[test]
    fn from_fill_uses_position() {
        let stroke = Stroke::from_fill(crate::fill::built_in().swap_remove(2));
        assert_eq!(stroke.name(), "Black dither 1");
        assert_eq!(stroke.pixel_color(v(0, 0), 1), Some(Color::Black));
        assert_eq!(stroke.pixel_color(v(1, 0), 0), None);
    }
    #[test]
    fn catalogue() {
        let names: Vec<_> = built_in().iter().map(|s| s.name().to_owned()).collect();
        assert_eq!(names[0], "Black");
        assert_eq!(names[5], "White dashed 2/2");
    }
}
