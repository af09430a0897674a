use super::{drag_box, origin_of, CursorMode, EditAction, Highlight, Target, Tool, ToolIcon};
use crate::color::Color;
use crate::commands::{CanvasCommand, ClipboardItem, Command};
use crate::space::{Bounds, Vector2};
use crate::state::canvas::commands::replace_shape;
use crate::state::canvas::Canvas;
use crate::state::layer::{Layer, PositionedShape, VerticalPosition};
use crate::state::shape::{self, Shape};
use std::sync::Arc;

/// Selects an area of a layer's top shape, for copying, cutting, or deleting.
/// The modifier locks the selection square.
#[derive(Default)]
pub struct Select {
    square: bool,
    selecting: bool,
    from: Option<Vector2>,
    target: Option<Target>,
    /// Relative to the layer.
    bounds: Option<Bounds>,
}
impl Select {
    /// The selection, in canvas coordinates.
    #[must_use]
    pub fn selection(&self) -> Option<Bounds> {
        Some(self.bounds?.translate(origin_of(self.target.as_ref())))
    }
    fn reset(&mut self) {
        self.selecting = false;
        self.from = None;
        self.bounds = None;
    }
    /// Run `operation` on the target layer's top shape, with the selection in that shape's space,
    /// then drop the selection.
    fn operate(
        &mut self,
        canvas: &Canvas,
        operation: impl FnOnce(&str, &PositionedShape, Bounds) -> Vec<Command>,
    ) -> Vec<Command> {
        let (Some(target), Some(bounds)) = (self.target.as_ref(), self.bounds) else {
            return Vec::new();
        };
        let Some(shape) = canvas.named_layer(&target.name).and_then(Layer::top_shape) else {
            return Vec::new();
        };
        let commands = operation(&target.name, shape, bounds.translate(-shape.origin));
        self.reset();
        commands
    }
}
fn with_shape(shape: &PositionedShape, replacement: impl Into<Shape>) -> PositionedShape {
    PositionedShape {
        shape: Arc::new(replacement.into()),
        ..shape.clone()
    }
}
impl Tool for Select {
    fn cursor(&self) -> CursorMode {
        CursorMode {
            icon: Some(ToolIcon::Square),
            icon_color: Some(Color::Black),
            highlight: Some(self.selection().map_or(Highlight::Pixel, Highlight::Area)),
        }
    }
    fn start(&mut self, pos: Vector2, layer: Option<&Layer>) {
        self.reset();
        self.selecting = true;
        self.from = Some(pos);
        self.target = Target::of(layer);
    }
    fn move_to(&mut self, pos: Vector2, _: Option<&Layer>) {
        let Some(from) = self.from.filter(|_| self.selecting) else {
            return;
        };
        let (origin, size) = drag_box(from, pos, origin_of(self.target.as_ref()), self.square);
        self.bounds = Some(Bounds::new(origin, origin + size));
    }
    fn finish(&mut self, _: Vector2, _: Option<&Layer>) -> Vec<Command> {
        self.selecting = false;
        Vec::new()
    }
    fn set_modifier(&mut self, held: bool) {
        self.square = held;
    }
    fn edit(&mut self, action: EditAction, canvas: &Canvas) -> Vec<Command> {
        match action {
            EditAction::Copy => self.operate(canvas, |layer, shape, bounds| {
                let copied = with_shape(shape, shape::copy_area(&shape.shape, bounds));
                vec![Command::copy(ClipboardItem::shape("copied area", layer, copied))]
            }),
            EditAction::Cut => self.operate(canvas, |layer, shape, bounds| {
                let (rest, cut) = shape::cut_area(&shape.shape, bounds);
                vec![
                    replace_shape(layer, 0, with_shape(shape, rest)),
                    Command::copy(ClipboardItem::shape("cut area", layer, with_shape(shape, cut))),
                ]
            }),
            EditAction::Delete => self.operate(canvas, |layer, shape, bounds| {
                vec![Command::atomic(vec![
                    CanvasCommand::DeleteShape {
                        layer_name: layer.to_owned(),
                        index: VerticalPosition::Index(0),
                    },
                    CanvasCommand::AddShape {
                        layer_name: Some(layer.to_owned()),
                        shape: Arc::new(shape::delete_area(&shape.shape, bounds).into()),
                        before_index: Some(VerticalPosition::Index(0)),
                        origin: Some(shape.origin),
                        merge_freeform: Some(false),
                        mask: None,
                    },
                ])]
            }),
        }
    }
    fn exit(&mut self) {
        self.reset();
        self.square = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::ClipboardCommand;
    use crate::space::v;
    use crate::state::shape::{Freeform, Rect};
    use crate::stroke::Stroke;
    use crate::tool::test::history;

    fn outline() -> Rect {
        Rect::new(v(3, 3), None, Some(Stroke::solid(Color::Black)))
    }
    fn select(tool: &mut Select, layer: Option<&Layer>, from: Vector2, to: Vector2) {
        tool.start(from, layer);
        tool.move_to(from, layer);
        tool.move_to(to, layer);
        assert!(tool.finish(to, layer).is_empty());
    }

    #[test]
    fn paste_adds_the_copied_area() {
        let mut history = history();
        history
            .handle_now([CanvasCommand::add_shape("a", PositionedShape::new(outline(), Vector2::ZERO)).into()])
            .unwrap();

        let mut tool = Select::default();
        select(&mut tool, history.canvas().top_layer(), v(0, 0), v(1, 1));
        assert_eq!(tool.selection(), Some(Bounds::new(v(0, 0), v(1, 1))));
        let mut commands = tool.edit(EditAction::Copy, history.canvas());
        assert!(tool.selection().is_none());
        commands.push(ClipboardCommand::Paste.into());
        history.handle_now(commands).unwrap();

        let layer = history.canvas().top_layer().unwrap();
        assert_eq!(layer.len(), 2);
        let pasted = layer.top_shape().unwrap().shape.pixels();
        assert_eq!(pasted.len(), 3);
        for pos in [v(0, 0), v(1, 0), v(0, 1)] {
            assert!(pasted.iter().any(|px| px.pos == pos && px.color == Color::Black), "{pos:?}");
        }
    }
    #[test]
    fn pasted_freeforms_are_not_merged() {
        let mut history = history();
        let freeform = Freeform::from_shape(&outline().into());
        history
            .handle_now([CanvasCommand::add_shape("a", PositionedShape::new(freeform, Vector2::ZERO)).into()])
            .unwrap();

        let mut tool = Select::default();
        select(&mut tool, history.canvas().top_layer(), v(0, 0), v(1, 1));
        let mut commands = tool.edit(EditAction::Copy, history.canvas());
        commands.push(ClipboardCommand::Paste.into());
        history.handle_now(commands).unwrap();

        assert_eq!(history.canvas().top_layer().unwrap().len(), 2);
    }
    #[test]
    fn cut_leaves_the_rest_behind() {
        let mut history = history();
        history
            .handle_now([CanvasCommand::add_shape("a", PositionedShape::new(outline(), v(1, 1))).into()])
            .unwrap();

        let mut tool = Select::default();
        select(&mut tool, history.canvas().top_layer(), v(1, 1), v(3, 1));
        let commands = tool.edit(EditAction::Cut, history.canvas());
        history.handle_now(commands).unwrap();

        let grid = history.canvas().flat_grid(&[]);
        assert_eq!(grid.get(v(2, 1)), None);
        assert_eq!(grid.get(v(1, 2)), Some(&Color::Black));
        assert_eq!(history.canvas().top_layer().unwrap().len(), 1);

        history.handle_now([ClipboardCommand::Paste.into()]).unwrap();
        let grid = history.canvas().flat_grid(&[]);
        assert_eq!(grid.get(v(2, 1)), Some(&Color::Black));
        assert_eq!(history.canvas().top_layer().unwrap().len(), 2);
    }
    #[test]
    fn delete_removes_the_area() {
        let mut history = history();
        history
            .handle_now([CanvasCommand::add_shape("a", PositionedShape::new(outline(), Vector2::ZERO)).into()])
            .unwrap();

        let mut tool = Select::default();
        select(&mut tool, history.canvas().top_layer(), v(2, 2), v(0, 2));
        let commands = tool.edit(EditAction::Delete, history.canvas());
        history.handle_now(commands).unwrap();

        let layer = history.canvas().top_layer().unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.top_shape().unwrap().shape.pixels().len(), 5);
        assert!(!history.can_paste());
    }
    #[test]
    fn click_clears_the_selection() {
        let layer = Layer::new("a");
        let mut tool = Select::default();
        select(&mut tool, Some(&layer), v(0, 0), v(2, 2));
        assert!(tool.selection().is_some());
        tool.start(v(5, 5), Some(&layer));
        assert!(tool.finish(v(5, 5), Some(&layer)).is_empty());
        assert_eq!(tool.cursor().highlight, Some(Highlight::Pixel));
        // Nothing selected, nothing to do.
        assert!(tool.edit(EditAction::Copy, &Canvas::new()).is_empty());
    }
    #[test]
    fn selection_follows_the_layer() {
        let mut layer = Layer::new("a");
        layer.origin = v(2, 2);
        let mut tool = Select::default();
        tool.set_modifier(true);
        select(&mut tool, Some(&layer), v(4, 4), v(5, 7));
        assert_eq!(tool.bounds, Some(Bounds::new(v(2, 2), v(5, 5))));
        assert_eq!(tool.selection(), Some(Bounds::new(v(4, 4), v(7, 7))));
    }
}
