//! # Fill
//!
//! Fills color the interior of shapes by position. Patterned fills tile the plane from the fill
//! origin of the shape that uses them.

use crate::color::Color;
use crate::grid::Grid;
use crate::space::{v, Vector2};

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Fill {
    Solid {
        color: Color,
    },
    Pattern {
        name: String,
        /// Always looping.
        #[serde(deserialize_with = "looping_grid")]
        grid: Grid<Color>,
    },
}

/// Deserialize a grid, forcing it to loop as patterns tile.
pub(crate) fn looping_grid<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Grid<Color>, D::Error> {
    let mut grid = <Grid<Color> as serde::Deserialize>::deserialize(deserializer)?;
    grid.set_looping(true);
    Ok(grid)
}

impl Fill {
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self::Solid { color }
    }
    /// A patterned fill. The grid is made to loop.
    #[must_use]
    pub fn pattern(name: impl Into<String>, mut grid: Grid<Color>) -> Self {
        grid.set_looping(true);
        Self::Pattern {
            name: name.into(),
            grid,
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Solid { color } => color.name(),
            Self::Pattern { name, .. } => name,
        }
    }
    /// Color at `pos`, relative to the fill origin.
    #[must_use]
    pub fn pixel_color(&self, pos: Vector2) -> Option<Color> {
        match self {
            Self::Solid { color } => Some(*color),
            Self::Pattern { grid, .. } => grid.get(pos).copied(),
        }
    }
    /// The repeating unit of this fill, for previews.
    #[must_use]
    pub fn grid(&self) -> Grid<Color> {
        match self {
            Self::Solid { color } => Grid::repeated(Some(*color)),
            Self::Pattern { grid, .. } => grid.clone(),
        }
    }
}

/// A 2x2 checkerboard of `a` and `b`.
#[must_use]
pub fn simple_dither(a: Option<Color>, b: Option<Color>) -> Grid<Color> {
    let mut pattern = Grid::new(v(2, 2), true);
    pattern.put(v(0, 0), a);
    pattern.put(v(1, 0), b);
    pattern.put(v(1, 1), a);
    pattern.put(v(0, 1), b);
    pattern
}

/// Fills offered to every document.
#[must_use]
pub fn built_in() -> Vec<Fill> {
    vec![
        Fill::solid(Color::Black),
        Fill::solid(Color::White),
        Fill::pattern("Black dither 1", simple_dither(Some(Color::Black), None)),
        Fill::pattern("White dither 1", simple_dither(Some(Color::White), None)),
    ]
}
