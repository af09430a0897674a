use super::{origin_of, preview_on_top, CursorMode, Highlight, Target, Tool, ToolIcon};
use crate::color::Color;
use crate::commands::{CanvasCommand, Command};
use crate::space::{v, Vector2};
use crate::state::canvas::VirtualShapes;
use crate::state::layer::{Layer, PositionedShape};
use crate::state::shape;
use crate::stroke::Stroke;
use std::sync::Arc;

/// Directions a line snaps to while the modifier is held: every 30 degrees or so.
const SNAP_ANGLES: [Vector2; 8] = [
    v(0, 1),
    v(1, 2),
    v(1, 1),
    v(2, 1),
    v(1, 0),
    v(2, -1),
    v(1, -1),
    v(1, -2),
];

/// Straight lines from where the pointer went down to where it is.
pub struct Line {
    pub stroke: Stroke,
    snap: bool,
    from: Option<(Vector2, Option<Target>)>,
    to: Option<Vector2>,
}
impl Default for Line {
    fn default() -> Self {
        Self {
            stroke: Stroke::solid(Color::Black),
            snap: false,
            from: None,
            to: None,
        }
    }
}
impl Line {
    fn current(&self) -> Option<(PositionedShape, Option<&Target>)> {
        let (from, target) = self.from.as_ref()?;
        let mut vector = self.to? - *from;
        if self.snap {
            vector = vector.snap_to(&SNAP_ANGLES).unwrap_or(vector);
        }
        let line = shape::Line::new(vector, self.stroke.clone());
        Some((
            PositionedShape {
                shape: Arc::new(line.into()),
                origin: *from - origin_of(target.as_ref()),
                hidden: false,
                mask: false,
            },
            target.as_ref(),
        ))
    }
}
impl Tool for Line {
    fn cursor(&self) -> CursorMode {
        CursorMode {
            icon: Some(ToolIcon::Pencil),
            icon_color: self.stroke.pixel_color(Vector2::ZERO, 0),
            highlight: Some(Highlight::Pixel),
        }
    }
    fn virtual_shapes(&self) -> Vec<VirtualShapes> {
        self.current()
            .map_or_else(Vec::new, |(shape, target)| preview_on_top(target, shape))
    }
    fn start(&mut self, pos: Vector2, layer: Option<&Layer>) {
        self.from = Some((pos, Target::of(layer)));
        self.to = None;
    }
    fn move_to(&mut self, pos: Vector2, _: Option<&Layer>) {
        self.to = Some(pos);
    }
    fn finish(&mut self, _: Vector2, _: Option<&Layer>) -> Vec<Command> {
        let commands = self
            .current()
            .map(|(shape, target)| {
                vec![CanvasCommand::AddShape {
                    layer_name: target.map(|target| target.name.clone()),
                    shape: shape.shape,
                    before_index: None,
                    origin: Some(shape.origin),
                    merge_freeform: None,
                    mask: None,
                }
                .into()]
            })
            .unwrap_or_default();
        self.from = None;
        self.to = None;
        commands
    }
    fn set_modifier(&mut self, held: bool) {
        self.snap = held;
    }
    fn exit(&mut self) {
        self.snap = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::shape::Shape;
    use crate::tool::test::history;

    /// Drag a line with no layer, and return the added line and its origin.
    fn drag(tool: &mut Line, from: Vector2, to: Vector2) -> (shape::Line, Vector2) {
        let mut history = history();
        tool.start(from, None);
        tool.move_to(to, None);
        history.handle_now(tool.finish(to, None)).unwrap();

        assert_eq!(history.canvas().layers().len(), 1);
        let shape = history.canvas().top_layer().unwrap().top_shape().unwrap();
        let Shape::Line(line) = shape.shape.as_ref() else {
            panic!("expected a line, got {shape:?}");
        };
        (line.clone(), shape.origin)
    }

    #[test]
    fn drags_lines_every_way() {
        for to in [v(4, 4), v(-4, 4), v(4, -4), v(-4, -4)] {
            let (line, origin) = drag(&mut Line::default(), Vector2::ZERO, to);
            assert_eq!(origin, Vector2::ZERO);
            assert_eq!(line.vector(), to);
            assert_eq!(line.pixels().len(), 5, "{to:?}");
        }
    }
    #[test]
    fn modifier_snaps_the_angle() {
        let mut tool = Line::default();
        tool.set_modifier(true);
        let (line, origin) = drag(&mut tool, Vector2::ZERO, v(10, 2));
        tool.set_modifier(false);
        assert_eq!(origin, Vector2::ZERO);
        assert_eq!(line.vector(), v(10, 0));
        assert_eq!(line.pixels().len(), 11);
    }
    #[test]
    fn click_without_moving_draws_nothing() {
        let mut tool = Line::default();
        tool.start(v(1, 1), None);
        assert!(tool.virtual_shapes().is_empty());
        assert!(tool.finish(v(1, 1), None).is_empty());
    }
    #[test]
    fn starts_relative_to_the_layer() {
        let mut layer = Layer::new("a");
        layer.origin = v(-2, 3);
        let mut tool = Line::default();
        tool.start(v(0, 0), Some(&layer));
        tool.move_to(v(1, 0), Some(&layer));
        let preview = tool.virtual_shapes();
        assert_eq!(preview[0].layer.as_deref(), Some("a"));
        assert_eq!(preview[0].shapes[&0][0].origin, v(2, -3));
    }
}
