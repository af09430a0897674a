//! # Tools
//!
//! Tools turn pointer gestures into commands. A gesture is a `start`, any number of `move_to`, and a
//! `finish`, all in canvas coordinates. While a gesture is in flight a tool may offer
//! [`VirtualShapes`] to preview its result, and on `finish` it hands back the commands to apply.
//!
//! Tools never touch the document themselves. The layer they act on is passed in by the caller,
//! usually the canvas' top layer, and only its name and origin are remembered between events.

mod drag;
mod eraser;
mod fill;
mod line;
mod pencil;
mod rect;
mod select;

pub use drag::{Drag, DragTarget};
pub use eraser::Eraser;
pub use fill::Fill;
pub use line::Line;
pub use pencil::Pencil;
pub use rect::Rect;
pub use select::Select;

use std::sync::Arc;

use crate::blend::BlendMode;
use crate::color::{Color, Pixel};
use crate::commands::Command;
use crate::space::{Bounds, Vector2};
use crate::state::canvas::{Canvas, VirtualShapes};
use crate::state::layer::{Layer, PositionedShape, VirtualLayerShapes};
use crate::state::shape::freeform::Freeform;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ToolIcon {
    Move,
    Pencil,
    Square,
    XSquare,
    Box,
}

/// What the cursor should look like, and what under it is about to be affected.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Highlight {
    Pixel,
    Shape,
    Layer,
    /// In canvas coordinates.
    Area(Bounds),
}
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct CursorMode {
    pub icon: Option<ToolIcon>,
    pub icon_color: Option<Color>,
    pub highlight: Option<Highlight>,
}

/// Edits which act on a tool's current state rather than on a gesture.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::EnumIter)]
pub enum EditAction {
    Copy,
    Cut,
    Delete,
}

pub trait Tool {
    fn cursor(&self) -> CursorMode;
    /// Preview of the gesture in flight. Positions are relative to the layer's origin.
    fn virtual_shapes(&self) -> Vec<VirtualShapes> {
        Vec::new()
    }
    fn start(&mut self, pos: Vector2, layer: Option<&Layer>);
    fn move_to(&mut self, _pos: Vector2, _layer: Option<&Layer>) {}
    /// End the gesture, returning the commands it produced.
    #[must_use]
    fn finish(&mut self, pos: Vector2, layer: Option<&Layer>) -> Vec<Command>;
    /// The modifier key changed. What it does, if anything, is up to the tool.
    fn set_modifier(&mut self, _held: bool) {}
    #[must_use]
    fn edit(&mut self, _action: EditAction, _canvas: &Canvas) -> Vec<Command> {
        Vec::new()
    }
    /// Called when the toolbox is switching away from this tool.
    fn exit(&mut self) {}
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, strum::EnumIter, strum::AsRefStr)]
pub enum ToolKind {
    #[default]
    Pencil,
    Line,
    Rect,
    Eraser,
    Fill,
    Select,
    Drag,
}
impl ToolKind {
    #[must_use]
    pub fn icon(self) -> ToolIcon {
        match self {
            Self::Pencil | Self::Line => ToolIcon::Pencil,
            Self::Rect | Self::Select => ToolIcon::Square,
            Self::Eraser => ToolIcon::XSquare,
            Self::Fill => ToolIcon::Box,
            Self::Drag => ToolIcon::Move,
        }
    }
}

/// One of each tool, and which one is in use. Tool settings are plain fields on each tool.
#[derive(Default)]
pub struct Toolbox {
    current: ToolKind,
    pub pencil: Pencil,
    pub line: Line,
    pub rect: Rect,
    pub eraser: Eraser,
    pub fill: Fill,
    pub select: Select,
    pub drag: Drag,
}
impl Toolbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn current(&self) -> ToolKind {
        self.current
    }
    /// Switch tools. The previous tool is told to exit.
    pub fn set_current(&mut self, kind: ToolKind) {
        if self.current != kind {
            log::debug!("Switching tool {} -> {}", self.current.as_ref(), kind.as_ref());
            self.tool_mut().exit();
        }
        self.current = kind;
    }
    #[must_use]
    pub fn tool(&self) -> &dyn Tool {
        match self.current {
            ToolKind::Pencil => &self.pencil,
            ToolKind::Line => &self.line,
            ToolKind::Rect => &self.rect,
            ToolKind::Eraser => &self.eraser,
            ToolKind::Fill => &self.fill,
            ToolKind::Select => &self.select,
            ToolKind::Drag => &self.drag,
        }
    }
    pub fn tool_mut(&mut self) -> &mut dyn Tool {
        match self.current {
            ToolKind::Pencil => &mut self.pencil,
            ToolKind::Line => &mut self.line,
            ToolKind::Rect => &mut self.rect,
            ToolKind::Eraser => &mut self.eraser,
            ToolKind::Fill => &mut self.fill,
            ToolKind::Select => &mut self.select,
            ToolKind::Drag => &mut self.drag,
        }
    }
}

/// The layer a gesture started on.
#[derive(Clone, PartialEq, Debug)]
struct Target {
    name: String,
    origin: Vector2,
}
impl Target {
    fn of(layer: Option<&Layer>) -> Option<Self> {
        layer.map(|layer| Self {
            name: layer.name().to_owned(),
            origin: layer.origin,
        })
    }
}
fn origin_of(target: Option<&Target>) -> Vector2 {
    target.map_or(Vector2::ZERO, |target| target.origin)
}
/// `shape` drawn on top of the target layer, or on a layer of its own without one.
fn preview_on_top(target: Option<&Target>, shape: PositionedShape) -> Vec<VirtualShapes> {
    let mut shapes = VirtualLayerShapes::new();
    shapes.insert(0, vec![shape]);
    vec![VirtualShapes {
        layer: target.map(|target| target.name.clone()),
        shapes,
        hidden: Vec::new(),
    }]
}
/// Pixels traced by a pointer during one gesture. Each position is kept once, with its first color.
struct Scribble {
    target: Option<Target>,
    /// Where the gesture started, relative to the layer.
    origin: Vector2,
    prev: Option<Vector2>,
    seen: hashbrown::HashSet<Vector2>,
    pixels: Vec<Pixel>,
}
impl Scribble {
    fn new(pos: Vector2, layer: Option<&Layer>) -> Self {
        let target = Target::of(layer);
        Self {
            origin: pos - origin_of(target.as_ref()),
            target,
            prev: None,
            seen: hashbrown::HashSet::new(),
            pixels: Vec::new(),
        }
    }
    /// Trace from the previous position to `pos`, coloring each new pixel with `color`.
    /// `color` receives positions relative to the gesture's origin.
    fn trace(&mut self, pos: Vector2, color: impl Fn(Vector2) -> Option<Color>) {
        let path = match self.prev {
            Some(prev) => prev.raster_line(pos),
            None => vec![pos],
        };
        let offset = self.origin + origin_of(self.target.as_ref());
        for pos in path {
            let pos = pos - offset;
            if let Some(color) = color(pos) {
                if self.seen.insert(pos) {
                    self.pixels.push(Pixel::new(pos, color));
                }
            }
        }
        self.prev = Some(pos);
    }
    fn shape(&self, mode: BlendMode, mask: bool) -> PositionedShape {
        PositionedShape {
            shape: Arc::new(Freeform::from_pixels(self.pixels.clone()).with_mode(mode).into()),
            origin: self.origin,
            hidden: false,
            mask,
        }
    }
}

/// Box spanned by a drag from `from` to `to`, with `from` mapped into the layer by `layer_origin`.
/// With `square`, both sides take the longer of the two.
fn drag_box(from: Vector2, to: Vector2, layer_origin: Vector2, square: bool) -> (Vector2, Vector2) {
    let mut size = to - from;
    if square {
        let longest = size.x.abs().max(size.y.abs());
        size = Vector2::new(
            if size.x > 0 { longest } else { -longest },
            if size.y > 0 { longest } else { -longest },
        );
    }
    let mut origin = from - layer_origin;
    if size.x < 0 {
        origin.x += size.x;
        size.x = -size.x;
    }
    if size.y < 0 {
        origin.y += size.y;
        size.y = -size.y;
    }
    (origin, size)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::io::{storage::MemoryStorage, EncodeError, GridEncoder};
    use crate::queue::History;
    use crate::space::v;
    use crate::Grid;

    struct NoEncoder;
    impl GridEncoder for NoEncoder {
        fn encode(&self, file_type: &str, _: &Grid<Color>) -> Result<Vec<u8>, EncodeError> {
            Err(EncodeError::UnsupportedType(file_type.to_owned()))
        }
    }
    pub fn history() -> History {
        History::new(MemoryStorage::new(), NoEncoder)
    }

    #[derive(Default)]
    struct Recorder {
        exits: usize,
    }
    impl Tool for Recorder {
        fn cursor(&self) -> CursorMode {
            CursorMode::default()
        }
        fn start(&mut self, _: Vector2, _: Option<&Layer>) {}
        fn finish(&mut self, _: Vector2, _: Option<&Layer>) -> Vec<Command> {
            Vec::new()
        }
        fn exit(&mut self) {
            self.exits += 1;
        }
    }

    #[test]
    fn tool_defaults_do_nothing() {
        let mut tool = Recorder::default();
        assert!(tool.virtual_shapes().is_empty());
        assert!(tool.edit(EditAction::Copy, &Canvas::new()).is_empty());
        tool.set_modifier(true);
        tool.exit();
        assert_eq!(tool.exits, 1);
    }
    #[test]
    fn switching_tools_exits_the_old_one() {
        let mut tools = Toolbox::new();
        assert_eq!(tools.current(), ToolKind::Pencil);
        tools.set_current(ToolKind::Select);
        let layer = Layer::new("a");
        tools.tool_mut().start(v(0, 0), Some(&layer));
        tools.tool_mut().move_to(v(2, 2), Some(&layer));
        assert_eq!(
            tools.tool().cursor().highlight,
            Some(Highlight::Area(Bounds::new(v(0, 0), v(2, 2))))
        );
        tools.set_current(ToolKind::Select);
        assert!(matches!(tools.tool().cursor().highlight, Some(Highlight::Area(_))));
        // Leaving clears the selection.
        tools.set_current(ToolKind::Fill);
        tools.set_current(ToolKind::Select);
        assert_eq!(tools.tool().cursor().highlight, Some(Highlight::Pixel));
    }
    #[test]
    fn every_kind_has_a_tool() {
        use strum::IntoEnumIterator;
        let mut tools = Toolbox::new();
        for kind in ToolKind::iter() {
            tools.set_current(kind);
            assert_eq!(tools.current(), kind);
            assert_eq!(tools.tool().cursor().icon, Some(kind.icon()), "{}", kind.as_ref());
        }
    }
    #[test]
    fn drag_boxes_are_normalized() {
        assert_eq!(drag_box(v(0, 0), v(-4, 4), v(0, 0), false), (v(-4, 0), v(4, 4)));
        assert_eq!(drag_box(v(1, 1), v(4, -1), v(1, 0), false), (v(0, -1), v(3, 2)));
        assert_eq!(drag_box(v(0, 0), v(-1, 3), v(0, 0), true), (v(-3, 0), v(3, 3)));
    }
}
