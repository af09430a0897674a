//! PNG export of flattened canvases.

use bitpaint_core::commands::PNG_TYPE;
use bitpaint_core::io::{EncodeError, GridEncoder};
use bitpaint_core::{Color, Grid, Vector2};

/// Encodes as 8 bit grayscale with alpha. Empty cells are fully transparent.
pub struct PngEncoder;

impl PngEncoder {
    /// Row-major gray+alpha pairs. An empty grid becomes a single transparent pixel, as PNG has no
    /// zero-sized images.
    fn pixels(grid: &Grid<Color>) -> (u32, u32, Vec<u8>) {
        let (width, height) = (grid.width().max(0), grid.height().max(0));
        if width == 0 || height == 0 {
            return (1, 1, vec![0, 0]);
        }
        let mut data = Vec::with_capacity((width * height * 2).unsigned_abs() as usize);
        for y in 0..height {
            for x in 0..width {
                match grid.get(Vector2::new(x, y)) {
                    Some(color) => data.extend_from_slice(&[color.luma(), u8::MAX]),
                    None => data.extend_from_slice(&[0, 0]),
                }
            }
        }
        (width.unsigned_abs(), height.unsigned_abs(), data)
    }
}
impl GridEncoder for PngEncoder {
    fn encode(&self, file_type: &str, grid: &Grid<Color>) -> Result<Vec<u8>, EncodeError> {
        if file_type != PNG_TYPE {
            return Err(EncodeError::UnsupportedType(file_type.to_owned()));
        }
        let (width, height, data) = Self::pixels(grid);
        let mut out = Vec::new();
        let mut try_block = || -> Result<(), png::EncodingError> {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::GrayscaleAlpha);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&data)?;
            writer.finish()
        };
        try_block().map_err(|e| EncodeError::Failed(Box::new(e)))?;
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bitpaint_core::space::v;

    #[test]
    fn gray_alpha_pixels() {
        let mut grid = Grid::new(v(2, 2), false);
        grid.put(v(0, 0), Some(Color::Black));
        grid.put(v(1, 0), Some(Color::White));
        let (width, height, data) = PngEncoder::pixels(&grid);
        assert_eq!((width, height), (2, 2));
        assert_eq!(data, vec![0, 255, 255, 255, 0, 0, 0, 0]);
    }
    #[test]
    fn empty_grid_is_one_transparent_pixel() {
        let grid = Grid::<Color>::new(v(0, 0), false);
        assert_eq!(PngEncoder::pixels(&grid), (1, 1, vec![0, 0]));
    }
    #[test]
    fn writes_png() {
        let grid = Grid::filled(v(3, 1), false, Some(Color::White));
        let bytes = PngEncoder.encode(PNG_TYPE, &grid).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 3);
        assert_eq!(reader.info().color_type, png::ColorType::GrayscaleAlpha);
    }
    #[test]
    fn only_png() {
        let grid = Grid::<Color>::new(v(1, 1), false);
        assert!(matches!(
            PngEncoder.encode("image/gif", &grid),
            Err(EncodeError::UnsupportedType(_))
        ));
    }
}
