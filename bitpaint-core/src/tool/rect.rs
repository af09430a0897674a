use super::{drag_box, origin_of, preview_on_top, CursorMode, Highlight, Target, Tool, ToolIcon};
use crate::blend::BlendMode;
use crate::color::Color;
use crate::commands::{CanvasCommand, Command};
use crate::fill::Fill;
use crate::space::{v, Vector2};
use crate::state::canvas::VirtualShapes;
use crate::state::layer::{Layer, PositionedShape};
use crate::state::shape;
use crate::stroke::Stroke;
use std::sync::Arc;

/// Rectangles spanning the drag, inclusive of both corners. The modifier locks them square.
pub struct Rect {
    pub mode: BlendMode,
    pub mask: bool,
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    square: bool,
    from: Option<(Vector2, Option<Target>)>,
    to: Option<Vector2>,
}
impl Default for Rect {
    fn default() -> Self {
        Self {
            mode: BlendMode::Normal,
            mask: false,
            fill: Some(Fill::solid(Color::Black)),
            stroke: None,
            square: false,
            from: None,
            to: None,
        }
    }
}
impl Rect {
    fn current(&self) -> Option<(PositionedShape, Option<&Target>)> {
        let (from, target) = self.from.as_ref()?;
        let (origin, size) = drag_box(*from, self.to?, origin_of(target.as_ref()), self.square);
        let rect = shape::Rect::new(size + v(1, 1), self.fill.clone(), self.stroke.clone())
            .with_fill_origin(origin)
            .with_mode(self.mode);
        Some((
            PositionedShape {
                shape: Arc::new(rect.into()),
                origin,
                hidden: false,
                mask: self.mask,
            },
            target.as_ref(),
        ))
    }
}
impl Tool for Rect {
    fn cursor(&self) -> CursorMode {
        CursorMode {
            icon: Some(ToolIcon::Square),
            icon_color: self
                .stroke
                .as_ref()
                .and_then(|stroke| stroke.pixel_color(Vector2::ZERO, 0)),
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
                    mask: Some(shape.mask),
                }
                .into()]
            })
            .unwrap_or_default();
        self.from = None;
        self.to = None;
        commands
    }
    fn set_modifier(&mut self, held: bool) {
        self.square = held;
    }
    fn exit(&mut self) {
        self.square = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::shape::Shape;
    use crate::tool::test::history;

    #[test]
    fn drags_rects_every_way() {
        for (to, expected) in [
            (v(4, 4), v(0, 0)),
            (v(-4, 4), v(-4, 0)),
            (v(4, -4), v(0, -4)),
            (v(-4, -4), v(-4, -4)),
        ] {
            let mut history = history();
            let mut tool = Rect::default();
            tool.start(Vector2::ZERO, None);
            tool.move_to(to, None);
            history.handle_now(tool.finish(to, None)).unwrap();

            assert_eq!(history.canvas().layers().len(), 1);
            let shape = history.canvas().top_layer().unwrap().top_shape().unwrap();
            assert!(matches!(shape.shape.as_ref(), Shape::Rect(_)));
            assert_eq!(shape.origin, expected, "{to:?}");
            assert_eq!(shape.shape.pixels().len(), 25, "{to:?}");
        }
    }
    #[test]
    fn modifier_keeps_it_square() {
        let mut tool = Rect {
            fill: None,
            stroke: Some(Stroke::solid(Color::White)),
            mode: BlendMode::Invert,
            ..Rect::default()
        };
        tool.set_modifier(true);
        tool.start(v(5, 5), None);
        tool.move_to(v(3, 6), None);
        let preview = tool.virtual_shapes();
        let shape = &preview[0].shapes[&0][0];
        assert_eq!(shape.origin, v(3, 5));
        let Shape::Rect(rect) = shape.shape.as_ref() else {
            panic!("expected a rect, got {shape:?}");
        };
        assert_eq!(rect.size(), v(3, 3));
        assert_eq!(rect.mode, BlendMode::Invert);
        assert_eq!(tool.cursor().icon_color, Some(Color::White));

        // Leaving the tool lets go of the modifier.
        tool.exit();
        let preview = tool.virtual_shapes();
        let Shape::Rect(rect) = preview[0].shapes[&0][0].shape.as_ref() else {
            unreachable!();
        };
        assert_eq!(rect.size(), v(3, 2));
    }
}
