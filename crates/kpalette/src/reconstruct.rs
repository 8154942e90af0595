use crate::cluster::Cluster;
use rgb::RGB8;

/// The palette-reduced image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputImage {
    width: u32,
    height: u32,
    pixels: Vec<RGB8>,
}

impl OutputImage {
    pub fn new(width: u32, height: u32, background: RGB8) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    pub fn pixel(&self, row: u32, col: u32) -> Option<RGB8> {
        self.index(row, col).map(|i| self.pixels[i])
    }

    /// RGBRGB… bytes, the same layout [`crate::InputImage::from_bytes`] accepts.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect()
    }

    #[cfg(feature = "image")]
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgb([p.r, p.g, p.b])
        })
    }

    fn index(&self, row: u32, col: u32) -> Option<usize> {
        let (row, col) = (row as usize, col as usize);
        (row < self.height as usize && col < self.width as usize)
            .then(|| row * self.width as usize + col)
    }
}

/// Paints every member pixel of every cluster with its cluster's centroid.
///
/// Centroids are brought up to date first. Positions no cluster claims keep
/// `background`.
pub fn reconstruct(
    clusters: &mut [Cluster],
    width: u32,
    height: u32,
    background: RGB8,
) -> OutputImage {
    let mut output = OutputImage::new(width, height, background);

    for cluster in clusters.iter_mut() {
        cluster.recompute_centroid();
        let colour = cluster.mean_value().to_rgb8();
        for member in cluster.members() {
            let Some(pos) = member.position else {
                continue;
            };
            if let Some(i) = output.index(pos.row, pos.col) {
                output.pixels[i] = colour;
            }
        }
    }

    output
}
