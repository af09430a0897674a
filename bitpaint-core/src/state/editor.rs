//! Per-user editor preferences. Unlike [`super::canvas::CanvasSettings`], these are not part of a
//! document, though `changeConfig` commands still flow through history.

use crate::fill::Fill;
use crate::space::{v, Vector2};
use crate::stroke::Stroke;

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Display pixels per canvas pixel.
    pub scale: u32,
    /// Size of the guide grid.
    pub grid: Vector2,
    pub show_coordinates: bool,
    pub theme: String,
    pub custom_fills: Vec<Fill>,
    pub custom_strokes: Vec<Stroke>,
    /// Export only the populated area of the canvas.
    pub crop_exports: bool,
}
impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale: 4,
            grid: v(16, 16),
            show_coordinates: true,
            theme: "playdate".to_owned(),
            custom_fills: Vec::new(),
            custom_strokes: Vec::new(),
            crop_exports: true,
        }
    }
}
impl EditorConfig {
    pub fn apply(&mut self, changes: EditorConfigChanges) {
        let EditorConfigChanges {
            scale,
            grid,
            show_coordinates,
            theme,
            custom_fills,
            custom_strokes,
            crop_exports,
        } = changes;
        if let Some(scale) = scale {
            self.scale = scale;
        }
        if let Some(grid) = grid {
            self.grid = grid;
        }
        if let Some(show_coordinates) = show_coordinates {
            self.show_coordinates = show_coordinates;
        }
        if let Some(theme) = theme {
            self.theme = theme;
        }
        if let Some(custom_fills) = custom_fills {
            self.custom_fills = custom_fills;
        }
        if let Some(custom_strokes) = custom_strokes {
            self.custom_strokes = custom_strokes;
        }
        if let Some(crop_exports) = crop_exports {
            self.crop_exports = crop_exports;
        }
    }
    /// Built-in fills followed by the user's own.
    #[must_use]
    pub fn fills(&self) -> Vec<Fill> {
        let mut fills = crate::fill::built_in();
        fills.extend(self.custom_fills.iter().cloned());
        fills
    }
    #[must_use]
    pub fn strokes(&self) -> Vec<Stroke> {
        let mut strokes = crate::stroke::built_in();
        strokes.extend(self.custom_strokes.iter().cloned());
        strokes
    }
}

/// A partial [`EditorConfig`].
#[derive(Clone, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vector2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_coordinates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fills: Option<Vec<Fill>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_strokes: Option<Vec<Stroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_exports: Option<bool>,
}
