use crate::init::Placement;
use crate::policy::ConvergencePolicy;
use rgb::RGB8;
use snafu::prelude::*;

/// Upper bound on the number of clusters a run may create.
pub const MAX_CLUSTERS: usize = 1 << 16;

pub const DEFAULT_BACKGROUND: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConfigError {
    #[snafu(display("cluster count must be positive"))]
    ZeroClusters,

    #[snafu(display("{requested} clusters requested, at most {MAX_CLUSTERS} are supported"))]
    TooManyClusters { requested: usize },

    #[snafu(display("pause interval must be positive"))]
    ZeroPauseInterval,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub placement: Placement,
    pub policy: ConvergencePolicy,
    /// Seed for random placement, `None` uses the crate's fixed seed.
    pub seed: Option<u64>,
    /// Run the per-pixel assignment on the rayon pool.
    pub parallel: bool,
    /// Colour of output pixels that no cluster claims.
    pub background: RGB8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            policy: ConvergencePolicy::default(),
            seed: None,
            parallel: false,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl Config {
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_background(mut self, background: RGB8) -> Self {
        self.background = background;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_cluster_count(self.placement.cluster_count())?;
        self.validate_policy()
    }

    /// Checks everything except the placement.
    pub fn validate_policy(&self) -> Result<(), ConfigError> {
        if let ConvergencePolicy::Interactive { pause_every } = self.policy {
            ensure!(pause_every > 0, ZeroPauseIntervalSnafu);
        }
        Ok(())
    }
}

pub(crate) fn check_cluster_count(requested: usize) -> Result<(), ConfigError> {
    ensure!(requested > 0, ZeroClustersSnafu);
    ensure!(requested <= MAX_CLUSTERS, TooManyClustersSnafu { requested });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_clusters_rejected() {
        let uniform = Config::default().with_placement(Placement::Uniform { factor: 0 });
        assert!(matches!(uniform.validate(), Err(ConfigError::ZeroClusters)));

        let random = Config::default().with_placement(Placement::Random { count: 0 });
        assert!(matches!(random.validate(), Err(ConfigError::ZeroClusters)));
    }

    #[test]
    fn too_many_clusters_rejected() {
        let config = Config::default().with_placement(Placement::Uniform { factor: 41 });
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManyClusters { requested: 68921 }
        ));
        assert!(err.to_string().contains("at most 65536"));

        let config = Config::default().with_placement(Placement::Uniform { factor: 40 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_pause_rejected() {
        let config =
            Config::default().with_policy(ConvergencePolicy::Interactive { pause_every: 0 });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPauseInterval)
        ));

        let config = Config::default().with_policy(ConvergencePolicy::Threshold { threshold: 0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn policy_checked_without_placement() {
        let config = Config::default()
            .with_placement(Placement::Random { count: 0 })
            .with_policy(ConvergencePolicy::Interactive { pause_every: 0 });
        assert!(matches!(
            config.validate_policy(),
            Err(ConfigError::ZeroPauseInterval)
        ));

        let config = Config::default().with_placement(Placement::Random { count: 0 });
        assert!(config.validate_policy().is_ok());
    }
}
