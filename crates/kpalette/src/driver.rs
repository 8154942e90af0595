//! The epoch loop.
//!
//! ```text
//! Initializing -> Running <-> Paused -> Done
//! ```
//!
//! Every epoch recomputes each centroid from the previous epoch's members,
//! empties the clusters, and reassigns every pixel. After the epoch the
//! convergence policy decides whether to continue, consulting the oracle at
//! checkpoints of the interactive policy.

use crate::InputImage;
use crate::assign;
use crate::cluster::Cluster;
use crate::config::{self, Config, ConfigError};
use crate::policy::{ContinuationOracle, Decision, History};
use crate::reconstruct::{self, OutputImage};
use crate::rng;
use crate::stats::EpochStats;
use log::{debug, info};
use rgb::RGB8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Clusters are placed, no epoch has run yet.
    Initializing,
    Running,
    /// Waiting on the continuation oracle.
    Paused,
    Done,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub epochs: Vec<EpochStats>,
    pub output: OutputImage,
    /// Centroids of the clusters that ended the run with at least one pixel.
    pub palette: Vec<RGB8>,
}

/// Owns the clusters and the loop state for one image.
#[derive(Debug)]
pub struct Quantizer<'a> {
    image: InputImage<'a>,
    config: Config,
    clusters: Vec<Cluster>,
    epoch: usize,
    history: History,
    phase: Phase,
}

impl<'a> Quantizer<'a> {
    /// Validates `config` and places the initial clusters.
    pub fn new(image: InputImage<'a>, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = rng::with_seed(config.seed.unwrap_or(rng::RANDOM_SEED));
        let clusters = config.placement.build(&mut rng);
        info!(
            "creating {} clusters for {} pixels",
            config.placement,
            image.pixel_count()
        );

        Ok(Self {
            image,
            config,
            clusters,
            epoch: 0,
            history: History::new(),
            phase: Phase::Initializing,
        })
    }

    /// Like [`Quantizer::new`], but starts from caller-placed clusters.
    ///
    /// `config.placement` and `config.seed` are ignored.
    pub fn with_clusters(
        image: InputImage<'a>,
        config: Config,
        clusters: Vec<Cluster>,
    ) -> Result<Self, ConfigError> {
        config::check_cluster_count(clusters.len())?;
        config.validate_policy()?;
        info!(
            "starting from {} given clusters for {} pixels",
            clusters.len(),
            image.pixel_count()
        );

        Ok(Self {
            image,
            config,
            clusters,
            epoch: 0,
            history: History::new(),
            phase: Phase::Initializing,
        })
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Number of finished epochs.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Runs one epoch without consulting the convergence policy.
    pub fn run_epoch(&mut self) -> EpochStats {
        self.phase = Phase::Running;

        for cluster in &mut self.clusters {
            cluster.clear_keep_position();
        }

        self.epoch += 1;
        let total_distance =
            assign::assign_image(&self.image, &mut self.clusters, self.config.parallel);
        let stats = EpochStats::collect(self.epoch, &self.clusters, total_distance);

        debug!("epoch {}: distribution {:?}", stats.epoch, stats.distribution);
        match stats.average_distance() {
            Some(avg) => info!(
                "epoch {}: reduced image to {} colours, average distance {avg:.2}",
                stats.epoch,
                stats.non_empty()
            ),
            None => info!(
                "epoch {}: reduced image to {} colours, average distance n/a",
                stats.epoch,
                stats.non_empty()
            ),
        }

        stats
    }

    /// Runs one epoch and lets the policy decide what comes next.
    ///
    /// The oracle is only called between epochs, at checkpoints of the
    /// interactive policy.
    pub fn step(&mut self, oracle: &mut impl ContinuationOracle) -> (EpochStats, Decision) {
        let stats = self.run_epoch();

        let policy = self.config.policy;
        let reply = if policy.is_checkpoint(stats.epoch, &self.history) {
            self.phase = Phase::Paused;
            let reply = oracle.ask(&stats);
            debug!("epoch {}: continuation reply {reply:?}", stats.epoch);
            Some(reply)
        } else {
            None
        };

        let decision = policy.decide(&stats, &self.history, reply);
        self.history.record(&stats, decision);

        self.phase = match decision {
            Decision::Stop => {
                info!("stopping after epoch {}", stats.epoch);
                Phase::Done
            }
            Decision::Continue | Decision::ContinueAfter(_) => Phase::Running,
        };

        (stats, decision)
    }

    /// Steps until the policy stops, then reconstructs the image.
    pub fn run(mut self, oracle: &mut impl ContinuationOracle) -> RunReport {
        let mut epochs = Vec::new();
        loop {
            let (stats, decision) = self.step(oracle);
            epochs.push(stats);
            if decision == Decision::Stop {
                break;
            }
        }

        let (output, palette) = self.finish();
        RunReport {
            epochs,
            output,
            palette,
        }
    }

    /// Paints the output from the current cluster membership.
    ///
    /// Returns the image and the centroids of the non-empty clusters.
    pub fn finish(mut self) -> (OutputImage, Vec<RGB8>) {
        let output = reconstruct::reconstruct(
            &mut self.clusters,
            self.image.width(),
            self.image.height(),
            self.config.background,
        );
        let palette = self
            .clusters
            .iter()
            .filter(|c| c.occupancy() > 0)
            .map(|c| c.mean_value().to_rgb8())
            .collect();

        (output, palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Placement;
    use crate::point::ColourPoint;
    use crate::policy::{ConvergencePolicy, Decline, Reply, Scripted};
    use pretty_assertions::assert_eq;

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height as usize {
            for x in 0..width as usize {
                buf.extend_from_slice(&[(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8]);
            }
        }
        buf
    }

    #[test]
    fn zero_clusters_rejected_before_running() {
        let buf = [1, 2, 3];
        let image = InputImage::from_bytes(1, 1, &buf).unwrap();
        let config = Config::default().with_placement(Placement::Random { count: 0 });
        assert!(matches!(
            Quantizer::new(image, config),
            Err(ConfigError::ZeroClusters)
        ));
    }

    #[test]
    fn given_clusters_are_validated() {
        let buf = [1, 2, 3];
        let image = InputImage::from_bytes(1, 1, &buf).unwrap();

        assert!(matches!(
            Quantizer::with_clusters(image, Config::default(), Vec::new()),
            Err(ConfigError::ZeroClusters)
        ));

        let too_many = vec![Cluster::new(ColourPoint::default()); config::MAX_CLUSTERS + 1];
        assert!(matches!(
            Quantizer::with_clusters(image, Config::default(), too_many),
            Err(ConfigError::TooManyClusters { .. })
        ));

        let config =
            Config::default().with_policy(ConvergencePolicy::Interactive { pause_every: 0 });
        let one = vec![Cluster::new(ColourPoint::default())];
        assert!(matches!(
            Quantizer::with_clusters(image, config, one.clone()),
            Err(ConfigError::ZeroPauseInterval)
        ));

        let q = Quantizer::with_clusters(image, Config::default(), one).unwrap();
        assert_eq!(q.clusters().len(), 1);
        assert_eq!(q.phase(), Phase::Initializing);
    }

    #[test]
    fn phases() {
        let buf = gradient(4, 4);
        let image = InputImage::from_bytes(4, 4, &buf).unwrap();
        let mut q = Quantizer::new(image, Config::default()).unwrap();
        assert_eq!(q.phase(), Phase::Initializing);
        assert_eq!(q.clusters().len(), 27);

        let mut oracle = Scripted::new([Reply::Next]);
        let (_, decision) = q.step(&mut oracle);
        assert_eq!(decision, Decision::ContinueAfter(1));
        assert_eq!(q.phase(), Phase::Running);

        let (_, decision) = q.step(&mut oracle);
        assert_eq!(decision, Decision::Stop);
        assert_eq!(q.phase(), Phase::Done);
        assert_eq!(q.epoch(), 2);
        assert_eq!(q.history().max_occupancy().len(), 2);
    }

    #[test]
    fn each_epoch_assigns_every_pixel() {
        let buf = gradient(16, 9);
        let image = InputImage::from_bytes(16, 9, &buf).unwrap();
        let config = Config::default().with_placement(Placement::Random { count: 12 });
        let mut q = Quantizer::new(image, config).unwrap();

        for _ in 0..4 {
            let stats = q.run_epoch();
            assert_eq!(stats.assigned(), 16 * 9);
            assert_eq!(stats.distribution.len(), 12);
        }
    }

    #[test]
    fn centroids_move_to_member_means_between_epochs() {
        let buf = [10, 10, 10, 30, 30, 30, 200, 200, 200];
        let image = InputImage::from_bytes(3, 1, &buf).unwrap();
        let config = Config::default().with_placement(Placement::Uniform { factor: 2 });
        let mut q = Quantizer::new(image, config).unwrap();

        q.run_epoch();
        // Before the next epoch the centroids still sit on the lattice.
        assert_eq!(q.clusters()[0].mean_value(), ColourPoint::new(0, 0, 0));
        assert_eq!(q.clusters()[0].occupancy(), 2);

        q.run_epoch();
        assert_eq!(q.clusters()[0].mean_value(), ColourPoint::new(20, 20, 20));
        assert_eq!(q.clusters()[7].mean_value(), ColourPoint::new(200, 200, 200));
    }

    #[test]
    fn run_reconstructs_and_reports_palette() {
        let buf = [10, 10, 10, 30, 30, 30, 200, 200, 200, 220, 220, 220];
        let image = InputImage::from_bytes(2, 2, &buf).unwrap();
        let config = Config::default()
            .with_placement(Placement::Uniform { factor: 2 })
            .with_policy(ConvergencePolicy::Threshold { threshold: 0 });

        let report = Quantizer::new(image, config).unwrap().run(&mut Decline);

        assert_eq!(report.epochs.len(), 2);
        assert_eq!(
            report.output.to_bytes(),
            vec![20, 20, 20, 20, 20, 20, 210, 210, 210, 210, 210, 210]
        );
        assert_eq!(
            report.palette,
            vec![RGB8 { r: 20, g: 20, b: 20 }, RGB8 { r: 210, g: 210, b: 210 }]
        );
    }
}
