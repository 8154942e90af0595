use crate::point::ColourPoint;
use rgb::RGB8;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InputImageError {
    #[snafu(display("image has no pixels ({width}x{height})"))]
    Empty { width: u32, height: u32 },

    #[snafu(display("a {width}x{height} RGB image needs {expected} bytes, got {actual}"))]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[snafu(display("a {width}x{height} image does not fit in memory"))]
    TooLarge { width: u32, height: u32 },
}

/// Borrowed, read-only RGB pixel grid in row-major RGBRGB… layout.
#[derive(Debug, Copy, Clone)]
pub struct InputImage<'a> {
    width: u32,
    height: u32,
    bytes: &'a [u8],
}

impl<'a> InputImage<'a> {
    pub fn from_bytes(width: u32, height: u32, bytes: &'a [u8]) -> Result<Self, InputImageError> {
        ensure!(width > 0 && height > 0, EmptySnafu { width, height });

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .context(TooLargeSnafu { width, height })?;
        ensure!(
            bytes.len() == expected,
            BufferSizeSnafu {
                width,
                height,
                expected,
                actual: bytes.len(),
            }
        );

        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.bytes.len() / 3
    }

    pub fn pixel(&self, row: u32, col: u32) -> Option<RGB8> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.rgb_at(row as usize * self.width as usize + col as usize))
    }

    /// The `i`-th pixel in scan order, tagged with its position.
    ///
    /// Panics if `i >= self.pixel_count()`.
    #[inline]
    pub fn point(&self, i: usize) -> ColourPoint {
        let w = self.width as usize;
        ColourPoint::from_pixel(self.rgb_at(i), (i / w) as u32, (i % w) as u32)
    }

    pub fn points(&self) -> impl Iterator<Item = ColourPoint> + '_ {
        (0..self.pixel_count()).map(|i| self.point(i))
    }

    #[inline]
    fn rgb_at(&self, i: usize) -> RGB8 {
        let [r, g, b] = [self.bytes[3 * i], self.bytes[3 * i + 1], self.bytes[3 * i + 2]];
        RGB8 { r, g, b }
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a image::RgbImage> for InputImage<'a> {
    type Error = InputImageError;

    fn try_from(img: &'a image::RgbImage) -> Result<Self, Self::Error> {
        Self::from_bytes(img.width(), img.height(), img.as_raw())
    }
}
