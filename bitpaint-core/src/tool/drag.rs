use super::{CursorMode, Highlight, Tool, ToolIcon};
use crate::color::Pixel;
use crate::commands::{CanvasCommand, Command};
use crate::space::Vector2;
use crate::state::canvas::VirtualShapes;
use crate::state::layer::{Layer, PositionedShape, VirtualLayerShapes};
use crate::state::shape::Freeform;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, strum::EnumIter, strum::AsRefStr)]
pub enum DragTarget {
    /// Everything on the layer.
    #[default]
    Layer,
    /// The topmost shape under the pointer.
    Shape,
}

struct Dragged {
    layer: String,
    layer_origin: Vector2,
    /// `None` when dragging the whole layer.
    index: Option<usize>,
    shape: PositionedShape,
    start_origin: Vector2,
    /// Real shapes left out of the preview while their stand-in moves.
    hidden: Vec<usize>,
}

/// Moves a layer, or one of its shapes. The modifier locks movement to the dominant axis.
#[derive(Default)]
pub struct Drag {
    pub target: DragTarget,
    axis_lock: bool,
    start: Option<Vector2>,
    vector: Vector2,
    dragged: Option<Dragged>,
}
impl Drag {
    /// The drag so far, locked to an axis if the modifier is held.
    #[must_use]
    pub fn offset(&self) -> Vector2 {
        let Vector2 { x, y } = self.vector;
        if !self.axis_lock {
            return self.vector;
        }
        Vector2::new(
            if x.abs() > y.abs() { x } else { 0 },
            if y.abs() > x.abs() { y } else { 0 },
        )
    }
    fn pick(&self, pos: Vector2, layer: &Layer) -> Option<Dragged> {
        let (index, shape, hidden) = match self.target {
            DragTarget::Layer => {
                let raster = layer.flat_grid(&VirtualLayerShapes::new());
                let pixels = raster
                    .grid
                    .values()
                    .map(|(pos, &color)| Pixel::new(pos + raster.offset, color))
                    .collect();
                let shape = PositionedShape::new(Freeform::from_pixels(pixels), Vector2::ZERO);
                (None, shape, (0..layer.len()).collect())
            }
            DragTarget::Shape => {
                let (index, shape) = layer.top_shape_at(pos - layer.origin)?;
                (Some(index), shape.clone(), vec![index])
            }
        };
        Some(Dragged {
            layer: layer.name().to_owned(),
            layer_origin: layer.origin,
            index,
            start_origin: shape.origin,
            shape,
            hidden,
        })
    }
    fn reset(&mut self) {
        self.start = None;
        self.vector = Vector2::ZERO;
        self.dragged = None;
    }
}
impl Tool for Drag {
    fn cursor(&self) -> CursorMode {
        let highlight = match (&self.dragged, self.target) {
            (Some(dragged), _) => {
                Highlight::Area(dragged.shape.bounds().translate(dragged.layer_origin))
            }
            (None, DragTarget::Layer) => Highlight::Layer,
            (None, DragTarget::Shape) => Highlight::Shape,
        };
        CursorMode {
            icon: Some(ToolIcon::Move),
            icon_color: None,
            highlight: Some(highlight),
        }
    }
    fn virtual_shapes(&self) -> Vec<VirtualShapes> {
        let Some(dragged) = &self.dragged else {
            return Vec::new();
        };
        // A mask goes below its own hidden original, so it masks what it masked before.
        let index = dragged.index.unwrap_or(0) + usize::from(dragged.shape.mask);
        let mut shapes = VirtualLayerShapes::new();
        shapes.insert(index, vec![dragged.shape.clone()]);
        vec![VirtualShapes {
            layer: Some(dragged.layer.clone()),
            shapes,
            hidden: dragged.hidden.clone(),
        }]
    }
    fn start(&mut self, pos: Vector2, layer: Option<&Layer>) {
        self.reset();
        if layer.map_or(true, Layer::is_empty) {
            return;
        }
        self.start = Some(pos);
        self.move_to(pos, layer);
    }
    fn move_to(&mut self, pos: Vector2, layer: Option<&Layer>) {
        let (Some(start), Some(layer)) = (self.start, layer) else {
            return;
        };
        if self.dragged.is_none() {
            self.dragged = self.pick(pos, layer);
        }
        self.vector = pos - start;
        let offset = self.offset();
        if let Some(dragged) = self.dragged.as_mut() {
            dragged.shape.origin = dragged.start_origin + offset;
        }
    }
    fn finish(&mut self, _: Vector2, _: Option<&Layer>) -> Vec<Command> {
        let offset = self.offset();
        let commands = match self.dragged.take() {
            Some(Dragged {
                layer, index: None, ..
            }) => vec![CanvasCommand::MoveLayer {
                name: layer,
                offset,
            }
            .into()],
            Some(Dragged {
                layer,
                index: Some(index),
                ..
            }) => vec![CanvasCommand::MoveShape {
                layer_name: layer,
                index,
                offset,
            }
            .into()],
            None => Vec::new(),
        };
        self.reset();
        commands
    }
    fn set_modifier(&mut self, held: bool) {
        self.axis_lock = held;
    }
    fn exit(&mut self) {
        self.reset();
        self.axis_lock = false;
    }
}
