use rgb::RGB8;
use snafu::prelude::*;
use std::fmt;
use std::ops::{Add, Div, Sub};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PointError {
    #[snafu(display("a colour point needs exactly 3 channels, got {len}"))]
    InvalidPoint { len: usize },

    #[snafu(display("channel {index} is not a finite number"))]
    NonFiniteChannel { index: usize },

    #[snafu(display("channel {index} is {value}, outside 0..=255"))]
    OutOfRange { index: usize, value: f64 },
}

/// Where a sampled pixel came from in the input grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

/// A colour in RGB space, optionally tagged with the pixel it was sampled from.
///
/// Channels are integers. They are nominally in `0..=255`, but intermediate
/// results of arithmetic (e.g. a difference) may leave that range; use
/// [`ColourPoint::to_rgb8`] to clamp back into a displayable colour. Addition
/// and subtraction saturate at the `i32` bounds.
///
/// Equality compares the three channels only, provenance is ignored.
#[derive(Debug, Copy, Clone, Default)]
pub struct ColourPoint {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
    pub position: Option<Position>,
}

impl ColourPoint {
    /// Unchecked: any `i32` is accepted, see [`ColourPoint::from_channels`] for
    /// a constructor that enforces `0..=255`.
    pub const fn new(red: i32, green: i32, blue: i32) -> Self {
        Self {
            red,
            green,
            blue,
            position: None,
        }
    }

    /// Builds a point from a pixel sample at `(row, col)`.
    pub fn from_pixel(pixel: RGB8, row: u32, col: u32) -> Self {
        Self::from(pixel).at(row, col)
    }

    /// Builds a point from any numeric triple, truncating each channel towards zero.
    ///
    /// Every truncated channel must lie in `0..=255`.
    pub fn from_channels(channels: &[f64]) -> Result<Self, PointError> {
        ensure!(
            channels.len() == 3,
            InvalidPointSnafu {
                len: channels.len()
            }
        );
        for (index, channel) in channels.iter().enumerate() {
            ensure!(channel.is_finite(), NonFiniteChannelSnafu { index });
            let value = channel.trunc();
            ensure!(
                (0.0..=255.0).contains(&value),
                OutOfRangeSnafu {
                    index,
                    value: *channel
                }
            );
        }

        Ok(Self::new(
            channels[0] as i32,
            channels[1] as i32,
            channels[2] as i32,
        ))
    }

    #[must_use]
    pub fn at(self, row: u32, col: u32) -> Self {
        Self {
            position: Some(Position { row, col }),
            ..self
        }
    }

    #[inline]
    pub fn squared_distance(self, other: Self) -> i64 {
        let dr = i64::from(self.red) - i64::from(other.red);
        let dg = i64::from(self.green) - i64::from(other.green);
        let db = i64::from(self.blue) - i64::from(other.blue);
        dr * dr + dg * dg + db * db
    }

    /// Euclidean distance between the two colours.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self.squared_distance(other) as f64).sqrt()
    }

    pub fn to_rgb8(self) -> RGB8 {
        let clamp = |c: i32| c.clamp(0, 255) as u8;
        RGB8 {
            r: clamp(self.red),
            g: clamp(self.green),
            b: clamp(self.blue),
        }
    }

    fn map(self, f: impl Fn(i32) -> i32) -> Self {
        Self::new(f(self.red), f(self.green), f(self.blue))
    }

    fn zip(self, other: Self, f: impl Fn(i32, i32) -> i32) -> Self {
        Self::new(
            f(self.red, other.red),
            f(self.green, other.green),
            f(self.blue, other.blue),
        )
    }
}

impl PartialEq for ColourPoint {
    fn eq(&self, other: &Self) -> bool {
        self.red == other.red && self.green == other.green && self.blue == other.blue
    }
}

impl Eq for ColourPoint {}

impl From<RGB8> for ColourPoint {
    fn from(pixel: RGB8) -> Self {
        Self::new(pixel.r.into(), pixel.g.into(), pixel.b.into())
    }
}

impl TryFrom<&[f64]> for ColourPoint {
    type Error = PointError;

    fn try_from(channels: &[f64]) -> Result<Self, Self::Error> {
        Self::from_channels(channels)
    }
}

impl fmt::Display for ColourPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

impl Add for ColourPoint {
    type Output = ColourPoint;

    fn add(self, rhs: ColourPoint) -> ColourPoint {
        self.zip(rhs, i32::saturating_add)
    }
}

impl Add<i32> for ColourPoint {
    type Output = ColourPoint;

    fn add(self, rhs: i32) -> ColourPoint {
        self.map(|c| c.saturating_add(rhs))
    }
}

impl Sub for ColourPoint {
    type Output = ColourPoint;

    fn sub(self, rhs: ColourPoint) -> ColourPoint {
        self.zip(rhs, i32::saturating_sub)
    }
}

impl Sub<i32> for ColourPoint {
    type Output = ColourPoint;

    fn sub(self, rhs: i32) -> ColourPoint {
        self.map(|c| c.saturating_sub(rhs))
    }
}

/// Fractional division, truncated towards zero per channel.
///
/// Dividing by zero saturates each non-zero channel to `i32::MAX`/`i32::MIN`
/// and maps zero channels to zero.
impl Div<f64> for ColourPoint {
    type Output = ColourPoint;

    fn div(self, rhs: f64) -> ColourPoint {
        self.map(|c| (f64::from(c) / rhs) as i32)
    }
}
