use crate::space::Vector2;

/// One of the two inks of a 1-bit display.
///
/// "No color" is expressed as `Option<Color>::None` everywhere, meaning transparent.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    strum::AsRefStr,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Black,
    White,
}
impl Color {
    /// The other color.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
    /// Display name, `"Black"` or `"White"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::White => "White",
        }
    }
    /// 8 bit luminance, as used by exporters.
    #[must_use]
    pub const fn luma(self) -> u8 {
        match self {
            Self::Black => 0,
            Self::White => 255,
        }
    }
}

/// A colored position.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Pixel {
    pub pos: Vector2,
    pub color: Color,
}
impl Pixel {
    #[must_use]
    pub const fn new(pos: Vector2, color: Color) -> Self {
        Self { pos, color }
    }
    #[must_use]
    pub fn translate(self, offset: Vector2) -> Self {
        Self {
            pos: self.pos + offset,
            ..self
        }
    }
}
