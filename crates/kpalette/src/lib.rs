//! Palette reduction by iterative k-means clustering in RGB space.
//!
//! Pixels are assigned to the nearest of a fixed set of clusters, every cluster
//! moves to the mean colour of its pixels, and the process repeats until a
//! [`ConvergencePolicy`] says stop. The image is then redrawn with one colour
//! per cluster.

pub mod assign;
pub mod cluster;
pub mod config;
pub mod driver;
pub mod grid;
pub mod init;
pub mod point;
pub mod policy;
pub mod reconstruct;
pub mod rng;
pub mod stats;

pub use config::{Config, ConfigError};
pub use driver::{Phase, Quantizer, RunReport};
pub use grid::{InputImage, InputImageError};
pub use init::Placement;
pub use point::{ColourPoint, Position};
pub use policy::{ContinuationOracle, ConvergencePolicy, Decision, Reply};
pub use reconstruct::OutputImage;
pub use rgb::RGB8;
pub use stats::EpochStats;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(context(false), display("invalid input image"))]
    Input { source: InputImageError },

    #[snafu(context(false), display("invalid configuration"))]
    Config { source: ConfigError },
}

/// Reduces the palette of `input` and returns the redrawn image with its run history.
///
/// The interactive policy never gets a reply here, so it stops at its first
/// checkpoint. Drive a [`Quantizer`] directly to supply a [`ContinuationOracle`].
///
/// ```
/// use kpalette::{Config, ConvergencePolicy, Placement};
///
/// let input = kpalette::InputImage::from_bytes(2, 1,
///   &[0, 0, 0, 255, 255, 255]
/// ).unwrap();
///
/// let config = Config::default()
///     .with_placement(Placement::Uniform { factor: 2 })
///     .with_policy(ConvergencePolicy::Threshold { threshold: 0 });
/// let report = kpalette::quantize(input, config).unwrap();
///
/// assert_eq!(report.output.to_bytes(), vec![0, 0, 0, 255, 255, 255]);
/// ```
pub fn quantize(input: InputImage, config: Config) -> Result<RunReport, Error> {
    let quantizer = Quantizer::new(input, config)?;
    Ok(quantizer.run(&mut policy::Decline))
}

/// Like [`quantize`], for a raw RGBRGB… buffer.
pub fn quantize_bytes(
    width: u32,
    height: u32,
    buf: &[u8],
    config: Config,
) -> Result<RunReport, Error> {
    let input = InputImage::from_bytes(width, height, buf)?;
    quantize(input, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn uniform_image_keeps_its_colour() {
        let buf = [200, 100, 50].repeat(100);
        let report = quantize_bytes(10, 10, &buf, Config::default()).unwrap();

        assert_eq!(report.epochs.len(), 1);
        assert_eq!(report.palette, vec![RGB8 { r: 200, g: 100, b: 50 }]);
        assert_eq!(report.output.to_bytes(), buf);
    }

    #[test]
    fn config_errors_surface() {
        let config = Config::default().with_placement(Placement::Random { count: 0 });
        let err = quantize_bytes(1, 1, &[1, 2, 3], config).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = quantize_bytes(1, 1, &[1, 2], Config::default()).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
    }
}
