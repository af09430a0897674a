//! # Playdate patterns
//!
//! The Playdate SDK describes 8x8 dither patterns as eight row bytes, optionally followed by eight
//! mask bytes. The most significant bit is the leftmost pixel. A set data bit is white, a clear one
//! is black, and a clear mask bit leaves the pixel transparent.

use crate::color::Color;
use crate::fill::Fill;
use crate::grid::Grid;
use crate::space::v;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PatternError {
    #[error("expected 16 or 32 hex digits, found {0}")]
    Length(usize),
    #[error("invalid hex byte {0:?}")]
    Hex(String),
    #[error("expected 8 or 16 table entries, found {0}")]
    TableLength(usize),
    #[error("invalid table entry {0:?}")]
    TableEntry(String),
}

pub type PatternData = [u8; 8];

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Pattern {
    pub data: PatternData,
    pub mask: Option<PatternData>,
}

impl Pattern {
    #[must_use]
    pub const fn from_data(data: PatternData) -> Self {
        Self { data, mask: None }
    }
    #[must_use]
    pub const fn with_mask(data: PatternData, mask: PatternData) -> Self {
        Self {
            data,
            mask: Some(mask),
        }
    }
    /// Parse `"5FEE77BBDDEEF5BB"`, with an optional second half for the mask.
    pub fn from_hex(text: &str) -> Result<Self, PatternError> {
        let text = text.trim();
        match text.len() {
            16 => Ok(Self::from_data(hex_bytes(text)?)),
            32 => {
                let (Some(data), Some(mask)) = (text.get(..16), text.get(16..)) else {
                    return Err(PatternError::Hex(text.to_owned()));
                };
                Ok(Self::with_mask(hex_bytes(data)?, hex_bytes(mask)?))
            }
            other => Err(PatternError::Length(other)),
        }
    }
    /// Parse a Lua table literal, `{0x5F, 0xEE, 0x77, 0xBB, 0xDD, 0xEE, 0xF5, 0xBB}`,
    /// as exported by common pattern tools. Decimal entries are accepted too.
    pub fn from_table(text: &str) -> Result<Self, PatternError> {
        let inner = text
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}');
        let bytes = inner
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let parsed = match entry
                    .strip_prefix("0x")
                    .or_else(|| entry.strip_prefix("0X"))
                {
                    Some(hex) => u8::from_str_radix(hex, 16),
                    None => entry.parse(),
                };
                parsed.map_err(|_| PatternError::TableEntry(entry.to_owned()))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let row = |from: usize| -> PatternData {
            let mut data = [0; 8];
            data.copy_from_slice(&bytes[from..from + 8]);
            data
        };
        match bytes.len() {
            8 => Ok(Self::from_data(row(0))),
            16 => Ok(Self::with_mask(row(0), row(8))),
            other => Err(PatternError::TableLength(other)),
        }
    }
    /// Lowercase hex, mask appended if present.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.data
            .iter()
            .chain(self.mask.iter().flatten())
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
    /// Expand into a looping 8x8 grid.
    #[must_use]
    pub fn grid(&self) -> Grid<Color> {
        let mut grid = Grid::new(v(8, 8), true);
        for (y, row) in (0..).zip(self.data) {
            let mask = self.mask.map_or(0xFF, |mask| mask[y as usize]);
            for x in 0..8 {
                if (mask >> x) & 1 == 0 {
                    continue;
                }
                let color = if (row >> x) & 1 == 1 {
                    Color::White
                } else {
                    Color::Black
                };
                grid.put(v(7 - x, y), Some(color));
            }
        }
        grid
    }
    #[must_use]
    pub fn to_fill(&self, name: impl Into<String>) -> Fill {
        Fill::pattern(name, self.grid())
    }
}
impl std::str::FromStr for Pattern {
    type Err = PatternError;
    /// Either format, chosen by a leading `{`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim_start().starts_with('{') {
            Self::from_table(s)
        } else {
            Self::from_hex(s)
        }
    }
}

fn hex_bytes(text: &str) -> Result<PatternData, PatternError> {
    let mut data = [0; 8];
    for (i, byte) in data.iter_mut().enumerate() {
        let digits = text
            .get(i * 2..i * 2 + 2)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| PatternError::Hex(text.to_owned()))?;
        *byte =
            u8::from_str_radix(digits, 16).map_err(|_| PatternError::Hex(digits.to_owned()))?;
    }
    Ok(data)
}

#[cfg(test)]
mod test {
    use super::*;
    const GRAY: PatternData = [0x5F, 0xEE, 0x77, 0xBB, 0xDD, 0xEE, 0xF5, 0xBB];
    #[test]
    fn parse_formats() {
        let hex = Pattern::from_hex("5FEE77BBDDEEF5BB").unwrap();
        assert_eq!(hex.data, GRAY);
        assert_eq!(hex.mask, None);
        let table: Pattern = "{0x5F, 0xEE, 0x77, 0xBB, 0xDD, 0xEE, 0xF5, 0xBB}"
            .parse()
            .unwrap();
        assert_eq!(table, hex);
        assert_eq!(hex.to_hex(), "5fee77bbddeef5bb");
    }
    #[test]
    fn masked() {
        let p = Pattern::from_hex("00000000000000000F0F0F0F0F0F0F0F").unwrap();
        assert_eq!(p.mask, Some([0x0F; 8]));
        let grid = p.grid();
        // Low bits are on the right.
        assert_eq!(grid.get(v(7, 0)), Some(&Color::Black));
        assert_eq!(grid.get(v(0, 0)), None);
        assert_eq!(grid.populated().len(), 32);
        assert_eq!(p.to_hex().len(), 32);
    }
    #[test]
    fn bit_layout() {
        let p = Pattern::from_data([0x80, 0x01, 0, 0, 0, 0, 0, 0]);
        let grid = p.grid();
        assert_eq!(grid.get(v(0, 0)), Some(&Color::White));
        assert_eq!(grid.get(v(1, 0)), Some(&Color::Black));
        assert_eq!(grid.get(v(7, 1)), Some(&Color::White));
        // Loops.
        assert_eq!(grid.get(v(8, 0)), Some(&Color::White));
        assert_eq!(p.to_fill("x").pixel_color(v(-1, 1)), Some(Color::White));
    }
    #[test]
    fn errors() {
        assert_eq!(Pattern::from_hex("abc"), Err(PatternError::Length(3)));
        assert!(matches!(
            Pattern::from_hex("zz00000000000000"),
            Err(PatternError::Hex(_))
        ));
        assert!(matches!(
            Pattern::from_hex("+F00000000000000"),
            Err(PatternError::Hex(_))
        ));
        // 32 bytes, but the halves don't split on a character.
        assert!(matches!(
            Pattern::from_hex("€€€€€€aaaaaaaaaaaaaa"),
            Err(PatternError::Hex(_))
        ));
        // 16 bytes of multibyte characters.
        assert!(matches!(
            Pattern::from_hex("€€€€€a"),
            Err(PatternError::Hex(_))
        ));
        assert_eq!(
            Pattern::from_table("{1, 2, 3}"),
            Err(PatternError::TableLength(3))
        );
        assert!(matches!(
            Pattern::from_table("{0x1FF, 0, 0, 0, 0, 0, 0, 0}"),
            Err(PatternError::TableEntry(_))
        ));
    }
}
