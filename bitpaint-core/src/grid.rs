//! # Grid
//!
//! A dense, fixed-size 2D array addressed by [`Vector2`], used for flattened rasters and for
//! repeating fill/stroke patterns.
//!
//! A looping grid wraps every coordinate with a non-negative modulo, so it tiles the plane.
//! A non-looping grid treats anything outside of `[0, size)` as absent.

use std::sync::OnceLock;

use crate::space::{v, Vector2};
use crate::util::floor_mod;

pub struct Grid<T> {
    size: Vector2,
    looping: bool,
    /// Column major, `x * height + y`.
    cells: Vec<Option<T>>,
    /// Positions of every `Some` cell, in column-major order. Reset on every mutation.
    populated: OnceLock<Vec<Vector2>>,
}

impl<T> Grid<T> {
    /// An empty grid. Negative dimensions are clamped to zero.
    #[must_use]
    pub fn new(size: Vector2, looping: bool) -> Self {
        let size = v(size.x.max(0), size.y.max(0));
        let len = size.x as usize * size.y as usize;
        let mut cells = Vec::with_capacity(len);
        cells.resize_with(len, || None);
        Self {
            size,
            looping,
            cells,
            populated: OnceLock::new(),
        }
    }
    #[must_use]
    pub fn size(&self) -> Vector2 {
        self.size
    }
    #[must_use]
    pub fn width(&self) -> i32 {
        self.size.x
    }
    #[must_use]
    pub fn height(&self) -> i32 {
        self.size.y
    }
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
    /// Resolve a position to an index into `cells`, wrapping or bounds checking as appropriate.
    fn index(&self, pos: Vector2) -> Option<usize> {
        let (x, y) = if self.looping {
            (floor_mod(pos.x, self.size.x)?, floor_mod(pos.y, self.size.y)?)
        } else if pos.x < 0 || pos.y < 0 || pos.x >= self.size.x || pos.y >= self.size.y {
            return None;
        } else {
            (pos.x, pos.y)
        };
        Some(x as usize * self.size.y as usize + y as usize)
    }
    #[must_use]
    pub fn get(&self, pos: Vector2) -> Option<&T> {
        self.index(pos).and_then(|idx| self.cells[idx].as_ref())
    }
    /// Store `value` at `pos`, returning whatever was there before.
    /// Writes outside of a non-looping grid are discarded.
    pub fn put(&mut self, pos: Vector2, value: Option<T>) -> Option<T> {
        let idx = self.index(pos)?;
        self.populated = OnceLock::new();
        std::mem::replace(&mut self.cells[idx], value)
    }
    /// Store the result of `compute(value, previous)` at `pos`, returning the previous value.
    pub fn put_with(
        &mut self,
        pos: Vector2,
        value: Option<T>,
        compute: impl FnOnce(Option<T>, Option<&T>) -> Option<T>,
    ) -> Option<T> {
        let idx = self.index(pos)?;
        let new = compute(value, self.cells[idx].as_ref());
        self.populated = OnceLock::new();
        std::mem::replace(&mut self.cells[idx], new)
    }
    pub fn remove(&mut self, pos: Vector2) -> Option<T> {
        self.put(pos, None)
    }
    pub fn clear(&mut self) {
        self.populated = OnceLock::new();
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }
    fn position_of(&self, idx: usize) -> Vector2 {
        let height = self.size.y.max(1) as usize;
        // Both parts are bounded by the dimensions, which are i32.
        v((idx / height) as i32, (idx % height) as i32)
    }
    /// Every cell in column-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Vector2, Option<&T>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.position_of(idx), cell.as_ref()))
    }
    /// Positions of every set cell, in column-major order.
    #[must_use]
    pub fn populated(&self) -> &[Vector2] {
        self.populated.get_or_init(|| {
            self.cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_some())
                .map(|(idx, _)| self.position_of(idx))
                .collect()
        })
    }
    /// Set cells paired with their values, in column-major order.
    pub fn values(&self) -> impl Iterator<Item = (Vector2, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| Some((self.position_of(idx), cell.as_ref()?)))
    }
    /// Cells of column `x`, top to bottom. Reported positions keep the requested `x` even when wrapped.
    #[must_use]
    pub fn column(&self, x: i32) -> Vec<(Vector2, Option<&T>)> {
        let col = if self.looping {
            floor_mod(x, self.size.x)
        } else {
            Some(x).filter(|x| (0..self.size.x).contains(x))
        };
        let Some(col) = col else {
            return Vec::new();
        };
        let height = self.size.y as usize;
        let start = col as usize * height;
        self.cells[start..start + height]
            .iter()
            .zip(0..)
            .map(|(cell, y)| (v(x, y), cell.as_ref()))
            .collect()
    }
    /// Cells of row `y`, left to right. Reported positions keep the requested `y` even when wrapped.
    #[must_use]
    pub fn row(&self, y: i32) -> Vec<(Vector2, Option<&T>)> {
        let row = if self.looping {
            floor_mod(y, self.size.y)
        } else {
            Some(y).filter(|y| (0..self.size.y).contains(y))
        };
        let Some(row) = row else {
            return Vec::new();
        };
        (0..self.size.x)
            .map(|x| {
                let idx = x as usize * self.size.y as usize + row as usize;
                (v(x, y), self.cells[idx].as_ref())
            })
            .collect()
    }
}

impl<T: Clone> Grid<T> {
    /// A grid with every cell set to `value`.
    #[must_use]
    pub fn filled(size: Vector2, looping: bool, value: Option<T>) -> Self {
        let mut grid = Self::new(size, looping);
        grid.fill(value);
        grid
    }
    /// A 1x1 looping grid, which reads as `value` everywhere.
    #[must_use]
    pub fn repeated(value: Option<T>) -> Self {
        Self::filled(v(1, 1), true, value)
    }
    pub fn fill(&mut self, value: Option<T>) {
        self.populated = OnceLock::new();
        self.cells.iter_mut().for_each(|cell| cell.clone_from(&value));
    }
    /// Tile this grid's contents into a new looping grid of `size`.
    #[must_use]
    pub fn scale_repeating(&self, size: Vector2) -> Self {
        let mut scaled = Self::new(size, true);
        for x in 0..scaled.width() {
            for y in 0..scaled.height() {
                let pos = v(x, y);
                scaled.put(pos, self.get(pos).cloned());
            }
        }
        scaled
    }
    /// The minimal sub-grid containing every set cell, or a 0x0 grid if nothing is set.
    /// The looping flag is carried over.
    #[must_use]
    pub fn cropped(&self) -> Self {
        let Some(bounds) = crate::space::Bounds::of_points(self.populated().iter().copied()) else {
            return Self::new(Vector2::ZERO, self.looping);
        };
        let mut cropped = Self::new(bounds.size(), self.looping);
        for (pos, value) in self.values() {
            cropped.put(pos - bounds.from, Some(value.clone()));
        }
        cropped
    }
}

impl<T: Clone> Clone for Grid<T> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            looping: self.looping,
            cells: self.cells.clone(),
            populated: self.populated.clone(),
        }
    }
}
impl<T: PartialEq> PartialEq for Grid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.looping == other.looping && self.cells == other.cells
    }
}
impl<T: Eq> Eq for Grid<T> {}
impl<T: std::fmt::Debug> std::fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size)
            .field("looping", &self.looping)
            .field("populated", &self.populated())
            .finish_non_exhaustive()
    }
}

/// On-disk shape of a grid: `{ "loop": bool, "grid": [[cell; height]; width] }`.
#[derive(serde::Serialize)]
struct GridRef<'a, T> {
    #[serde(rename = "loop")]
    looping: bool,
    grid: Vec<&'a [Option<T>]>,
}
#[derive(serde::Deserialize)]
struct GridOwned<T> {
    #[serde(rename = "loop", default)]
    looping: bool,
    grid: Vec<Vec<Option<T>>>,
}

impl<T: serde::Serialize> serde::Serialize for Grid<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let height = self.size.y as usize;
        let grid = if height == 0 {
            // `chunks` panics on zero, and a zero-height grid has empty columns anyway.
            (0..self.size.x).map(|_| &self.cells[..0]).collect()
        } else {
            self.cells.chunks(height).collect()
        };
        GridRef {
            looping: self.looping,
            grid,
        }
        .serialize(serializer)
    }
}
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Grid<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let GridOwned { looping, grid } = GridOwned::deserialize(deserializer)?;
        let height = grid.first().map_or(0, Vec::len);
        let width = i32::try_from(grid.len()).map_err(serde::de::Error::custom)?;
        let height_i32 = i32::try_from(height).map_err(serde::de::Error::custom)?;
        let mut cells = Vec::with_capacity(grid.len() * height);
        for mut column in grid {
            // Ragged columns are padded or truncated to the first column's height.
            column.resize_with(height, || None);
            cells.extend(column);
        }
        let mut result = Self::new(v(width, height_i32), looping);
        result.cells = cells;
        Ok(result)
    }
}
