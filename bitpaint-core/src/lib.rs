pub mod blend;
pub mod color;
pub mod commands;
pub mod fill;
pub mod grid;
pub mod io;
pub mod pattern;
pub mod queue;
pub mod space;
pub mod state;
pub mod stroke;
pub mod tool;
pub mod util;

pub use color::Color;
pub use grid::Grid;
pub use space::{Bounds, Vector2};
