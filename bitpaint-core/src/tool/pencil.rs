use super::{preview_on_top, CursorMode, Highlight, Scribble, Tool, ToolIcon};
use crate::blend::BlendMode;
use crate::color::Color;
use crate::commands::{CanvasCommand, Command};
use crate::grid::Grid;
use crate::space::Vector2;
use crate::state::canvas::VirtualShapes;
use crate::state::layer::Layer;

/// Freehand drawing into a new freeform shape.
pub struct Pencil {
    pub mode: BlendMode,
    pub color: Color,
    pub mask: bool,
    stroke: Option<Scribble>,
}
impl Default for Pencil {
    fn default() -> Self {
        Self {
            mode: BlendMode::Normal,
            color: Color::Black,
            mask: false,
            stroke: None,
        }
    }
}
impl Pencil {
    fn pattern(&self) -> Grid<Color> {
        Grid::repeated(Some(self.color))
    }
}
impl Tool for Pencil {
    fn cursor(&self) -> CursorMode {
        CursorMode {
            icon: Some(ToolIcon::Pencil),
            icon_color: self.pattern().get(Vector2::ZERO).copied(),
            highlight: Some(Highlight::Pixel),
        }
    }
    fn virtual_shapes(&self) -> Vec<VirtualShapes> {
        self.stroke.as_ref().map_or_else(Vec::new, |stroke| {
            preview_on_top(stroke.target.as_ref(), stroke.shape(self.mode, self.mask))
        })
    }
    fn start(&mut self, pos: Vector2, layer: Option<&Layer>) {
        self.stroke = Some(Scribble::new(pos, layer));
        self.move_to(pos, layer);
    }
    fn move_to(&mut self, pos: Vector2, _: Option<&Layer>) {
        let pattern = self.pattern();
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.trace(pos, |pos| pattern.get(pos).copied());
        }
    }
    fn finish(&mut self, _: Vector2, _: Option<&Layer>) -> Vec<Command> {
        let Some(stroke) = self.stroke.take() else {
            return Vec::new();
        };
        let shape = stroke.shape(self.mode, self.mask);
        vec![CanvasCommand::AddShape {
            layer_name: stroke.target.map(|target| target.name),
            shape: shape.shape,
            before_index: None,
            origin: Some(shape.origin),
            merge_freeform: None,
            mask: Some(shape.mask),
        }
        .into()]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Pixel;
    use crate::space::v;
    use crate::tool::test::history;

    /// Draw through `path` with no layer, and return the added shape's pixels and origin.
    fn draw(path: &[Vector2]) -> (Vec<Pixel>, Vector2) {
        let mut tool = Pencil::default();
        let mut history = history();
        tool.start(path[0], None);
        for &pos in &path[1..] {
            tool.move_to(pos, None);
        }
        history.handle_now(tool.finish(path[path.len() - 1], None)).unwrap();

        let layer = history.canvas().top_layer().unwrap();
        assert_eq!(layer.len(), 1);
        let shape = layer.top_shape().unwrap();
        assert!(shape.shape.is_freeform());
        (shape.shape.pixels().to_vec(), shape.origin)
    }

    #[test]
    fn click_draws_a_point() {
        let (pixels, origin) = draw(&[v(1, 1)]);
        assert_eq!(origin, v(1, 1));
        assert_eq!(pixels, vec![Pixel::new(v(0, 0), Color::Black)]);
    }
    #[test]
    fn single_stroke() {
        let (pixels, origin) = draw(&[v(1, 1), v(3, 3)]);
        assert_eq!(origin, v(1, 1));
        assert_eq!(pixels.len(), 3);
        for pos in [v(0, 0), v(1, 1), v(2, 2)] {
            assert!(pixels.contains(&Pixel::new(pos, Color::Black)), "{pos:?}");
        }
    }
    #[test]
    fn many_strokes() {
        let (pixels, origin) = draw(&[v(1, 1), v(3, 3), v(3, 2), v(2, 0)]);
        assert_eq!(origin, v(1, 1));
        assert_eq!(pixels.len(), 6);
        for pos in [v(0, 0), v(1, 1), v(2, 2), v(2, 1), v(2, 0), v(1, -1)] {
            assert!(pixels.contains(&Pixel::new(pos, Color::Black)), "{pos:?}");
        }
    }
    #[test]
    fn crossed_pixels_are_kept_once() {
        let (pixels, origin) = draw(&[v(1, 1), v(3, 3), v(1, 1)]);
        assert_eq!(origin, v(1, 1));
        assert_eq!(pixels.len(), 3);
    }
    #[test]
    fn draws_relative_to_the_layer() {
        let mut layer = Layer::new("moved");
        layer.origin = v(10, 0);
        let mut tool = Pencil {
            color: Color::White,
            mask: true,
            ..Pencil::default()
        };
        tool.start(v(12, 1), Some(&layer));
        tool.move_to(v(13, 1), Some(&layer));

        let preview = tool.virtual_shapes();
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].layer.as_deref(), Some("moved"));
        assert_eq!(preview[0].shapes[&0][0].origin, v(2, 1));

        let commands = tool.finish(v(13, 1), Some(&layer));
        let Some(CanvasCommand::AddShape {
            layer_name,
            shape,
            origin,
            mask,
            ..
        }) = commands[0].canvas()
        else {
            panic!("expected a shape, got {commands:?}");
        };
        assert_eq!(layer_name.as_deref(), Some("moved"));
        assert_eq!(*origin, Some(v(2, 1)));
        assert_eq!(*mask, Some(true));
        assert_eq!(
            shape.pixels(),
            &[Pixel::new(v(0, 0), Color::White), Pixel::new(v(1, 0), Color::White)]
        );
        assert!(tool.virtual_shapes().is_empty());
    }
}
