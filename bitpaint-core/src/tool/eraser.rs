use super::{preview_on_top, CursorMode, Highlight, Scribble, Tool, ToolIcon};
use crate::blend::BlendMode;
use crate::color::Color;
use crate::commands::{CanvasCommand, Command};
use crate::space::Vector2;
use crate::state::canvas::VirtualShapes;
use crate::state::layer::{Layer, VerticalPosition};

/// Erases from the top shape of a layer, by masking it and merging the mask in.
#[derive(Default)]
pub struct Eraser {
    stroke: Option<Scribble>,
}
impl Tool for Eraser {
    fn cursor(&self) -> CursorMode {
        CursorMode {
            icon: Some(ToolIcon::XSquare),
            icon_color: Some(Color::Black),
            highlight: Some(Highlight::Pixel),
        }
    }
    fn virtual_shapes(&self) -> Vec<VirtualShapes> {
        self.stroke.as_ref().map_or_else(Vec::new, |stroke| {
            preview_on_top(stroke.target.as_ref(), stroke.shape(BlendMode::Normal, true))
        })
    }
    fn start(&mut self, pos: Vector2, layer: Option<&Layer>) {
        self.stroke = Some(Scribble::new(pos, layer));
        self.move_to(pos, layer);
    }
    fn move_to(&mut self, pos: Vector2, _: Option<&Layer>) {
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.trace(pos, |_| Some(Color::Black));
        }
    }
    fn finish(&mut self, _: Vector2, _: Option<&Layer>) -> Vec<Command> {
        // Nothing to erase from without a layer.
        let Some((mask, target)) = self
            .stroke
            .take()
            .and_then(|stroke| Some((stroke.shape(BlendMode::Normal, true), stroke.target?)))
        else {
            return Vec::new();
        };
        vec![Command::atomic(vec![
            CanvasCommand::AddShape {
                layer_name: Some(target.name.clone()),
                shape: mask.shape,
                before_index: Some(VerticalPosition::Index(0)),
                origin: Some(mask.origin),
                merge_freeform: Some(false),
                mask: Some(true),
            },
            CanvasCommand::MergeShapeDown {
                layer_name: target.name,
                index: 0,
            },
        ])]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::AnyCommand;
    use crate::fill::Fill;
    use crate::space::v;
    use crate::state::shape::Rect;
    use crate::tool::test::history;
    use std::sync::Arc;

    fn rect(layer: &str, size: Vector2, color: Color) -> Command {
        CanvasCommand::AddShape {
            layer_name: Some(layer.into()),
            shape: Arc::new(Rect::new(size, Some(Fill::solid(color)), None).into()),
            before_index: None,
            origin: None,
            merge_freeform: None,
            mask: None,
        }
        .into()
    }

    #[test]
    fn erases_the_top_shape() {
        let mut history = history();
        history
            .handle_now([
                rect("bottom", v(2, 3), Color::White),
                rect("top", v(3, 3), Color::Black),
            ])
            .unwrap();

        let mut tool = Eraser::default();
        tool.start(v(0, 1), history.canvas().top_layer());
        tool.move_to(v(5, 1), history.canvas().top_layer());
        let commands = tool.finish(v(5, 1), history.canvas().top_layer());
        history.handle_now(commands).unwrap();

        let grid = history.canvas().flat_grid(&[]);
        assert_eq!(grid.populated().len(), 8);
        for x in 0..3 {
            assert_eq!(grid.get(v(x, 0)), Some(&Color::Black));
            assert_eq!(grid.get(v(x, 2)), Some(&Color::Black));
        }
        assert_eq!(grid.get(v(0, 1)), Some(&Color::White));
        assert_eq!(grid.get(v(1, 1)), Some(&Color::White));
        assert_eq!(grid.get(v(2, 1)), None);
        // Merged away, not left behind as a mask.
        assert_eq!(history.canvas().top_layer().unwrap().len(), 1);
    }
    #[test]
    fn erased_pixels_are_kept_once() {
        let mut history = history();
        history.handle_now([rect("a", v(2, 3), Color::Black)]).unwrap();

        let mut tool = Eraser::default();
        tool.start(v(0, 0), history.canvas().top_layer());
        tool.move_to(v(3, 0), None);
        tool.move_to(v(0, 0), None);
        let commands = tool.finish(v(0, 0), None);

        let Some(AnyCommand::Atomic { commands }) = commands[0].any() else {
            panic!("expected an atomic group, got {commands:?}");
        };
        let Some(CanvasCommand::AddShape { shape, .. }) = commands.first() else {
            panic!("expected a mask first, got {commands:?}");
        };
        assert_eq!(shape.pixels().len(), 4);
    }
    #[test]
    fn nothing_to_erase_without_a_layer() {
        let mut tool = Eraser::default();
        tool.start(v(0, 0), None);
        tool.move_to(v(3, 0), None);
        assert_eq!(tool.virtual_shapes().len(), 1);
        assert!(tool.finish(v(3, 0), None).is_empty());
        assert!(tool.virtual_shapes().is_empty());
    }
}
