use crate::color::Color;

/// How a shape's colors combine with whatever lies beneath it.
#[derive(
    strum::AsRefStr,
    PartialEq,
    Eq,
    strum::EnumIter,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlendMode {
    /// Top replaces bottom wherever top is present.
    #[default]
    Normal,
    /// Where both are present, the bottom flips to the other color.
    /// Otherwise whichever is present wins.
    Invert,
}
impl BlendMode {
    #[must_use]
    pub fn is_normal(&self) -> bool {
        *self == Self::Normal
    }
}

/// Combine two optional colors.
#[must_use]
pub fn blend(mode: BlendMode, bottom: Option<Color>, top: Option<Color>) -> Option<Color> {
    match (mode, bottom, top) {
        (_, bottom, None) => bottom,
        (BlendMode::Normal, _, top) | (BlendMode::Invert, None, top) => top,
        (BlendMode::Invert, Some(bottom), Some(_)) => Some(bottom.inverted()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use Color::{Black, White};
    #[test]
    fn normal() {
        assert_eq!(blend(BlendMode::Normal, Some(Black), Some(White)), Some(White));
        assert_eq!(blend(BlendMode::Normal, Some(Black), None), Some(Black));
        assert_eq!(blend(BlendMode::Normal, None, Some(White)), Some(White));
        assert_eq!(blend(BlendMode::Normal, None, None), None);
    }
    #[test]
    fn invert() {
        // The top color doesn't matter, only its presence.
        assert_eq!(blend(BlendMode::Invert, Some(Black), Some(White)), Some(White));
        assert_eq!(blend(BlendMode::Invert, Some(Black), Some(Black)), Some(White));
        assert_eq!(blend(BlendMode::Invert, Some(White), Some(Black)), Some(Black));
        assert_eq!(blend(BlendMode::Invert, None, Some(Black)), Some(Black));
        assert_eq!(blend(BlendMode::Invert, Some(White), None), Some(White));
        assert_eq!(blend(BlendMode::Invert, None, None), None);
    }
    #[test]
    fn serde_names() {
        assert_eq!(BlendMode::Invert.as_ref(), "invert");
        assert_eq!(
            serde_json::from_str::<BlendMode>("\"normal\"").unwrap(),
            BlendMode::Normal
        );
    }
}
