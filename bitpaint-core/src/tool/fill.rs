use super::{CursorMode, Highlight, Tool, ToolIcon};
use crate::color::Color;
use crate::commands::Command;
use crate::fill;
use crate::space::Vector2;
use crate::state::canvas::commands::replace_shape;
use crate::state::layer::{Layer, PositionedShape};
use std::sync::Arc;

/// Fills the topmost shape under the pointer, once the pointer is released.
pub struct Fill {
    pub fill: fill::Fill,
    started: bool,
}
impl Default for Fill {
    fn default() -> Self {
        Self {
            fill: fill::Fill::solid(Color::Black),
            started: false,
        }
    }
}
impl Tool for Fill {
    fn cursor(&self) -> CursorMode {
        CursorMode {
            icon: Some(ToolIcon::Box),
            icon_color: self.fill.pixel_color(Vector2::ZERO),
            highlight: Some(Highlight::Pixel),
        }
    }
    fn start(&mut self, _: Vector2, _: Option<&Layer>) {
        self.started = true;
    }
    fn finish(&mut self, pos: Vector2, layer: Option<&Layer>) -> Vec<Command> {
        if !std::mem::take(&mut self.started) {
            return Vec::new();
        }
        let Some(layer) = layer else {
            return Vec::new();
        };
        let Some((index, target)) = layer.top_shape_at(pos - layer.origin) else {
            return Vec::new();
        };
        let Some(filled) = target.shape.filled(pos - layer.origin - target.origin, &self.fill) else {
            log::trace!("Nothing to fill at {pos:?}");
            return Vec::new();
        };
        vec![replace_shape(
            layer.name(),
            index,
            PositionedShape {
                shape: Arc::new(filled),
                ..target.clone()
            },
        )]
    }
}
