use crate::cluster::Cluster;
use crate::point::ColourPoint;
use rand::Rng;
use std::fmt;

/// How the initial centroids are laid out in the RGB cube.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placement {
    /// `factor³` centroids on a lattice, see [`uniform`].
    Uniform { factor: usize },
    /// `count` centroids drawn uniformly at random, see [`random`].
    Random { count: usize },
}

impl Placement {
    /// Number of clusters this placement produces, saturating on overflow.
    pub fn cluster_count(&self) -> usize {
        match *self {
            Placement::Uniform { factor } => factor.saturating_mul(factor).saturating_mul(factor),
            Placement::Random { count } => count,
        }
    }

    pub fn build(&self, rng: &mut impl Rng) -> Vec<Cluster> {
        match *self {
            Placement::Uniform { factor } => uniform(factor),
            Placement::Random { count } => random(rng, count),
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Uniform { factor: 3 }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Uniform { .. } => write!(f, "{} uniform", self.cluster_count()),
            Placement::Random { count } => write!(f, "{count} random"),
        }
    }
}

// Index 0 maps to 0, index i maps to 255 / i (truncated). Note this is not an
// evenly spaced lattice: for factor 3 the channel values are 0, 255, 127.
#[inline]
fn lattice_channel(index: usize) -> i32 {
    if index == 0 { 0 } else { (255 / index) as i32 }
}

/// Creates `factor³` clusters on a lattice over the RGB cube, red-major.
pub fn uniform(factor: usize) -> Vec<Cluster> {
    let mut clusters = Vec::with_capacity(factor.pow(3));
    for r in 0..factor {
        for g in 0..factor {
            for b in 0..factor {
                clusters.push(Cluster::new(ColourPoint::new(
                    lattice_channel(r),
                    lattice_channel(g),
                    lattice_channel(b),
                )));
            }
        }
    }
    clusters
}

/// Creates `count` clusters with each channel sampled independently from `0..=255`.
pub fn random(rng: &mut impl Rng, count: usize) -> Vec<Cluster> {
    (0..count)
        .map(|_| {
            Cluster::new(ColourPoint::new(
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                rng.random_range(0..=255),
            ))
        })
        .collect()
}
