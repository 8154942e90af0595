use crate::cluster::Cluster;

/// Diagnostics gathered at the end of one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Occupancy of every cluster, in cluster order.
    pub distribution: Vec<usize>,
    pub total_distance: f64,
}

impl EpochStats {
    pub fn collect(epoch: usize, clusters: &[Cluster], total_distance: f64) -> Self {
        Self {
            epoch,
            distribution: clusters.iter().map(Cluster::occupancy).collect(),
            total_distance,
        }
    }

    pub fn assigned(&self) -> usize {
        self.distribution.iter().sum()
    }

    /// Number of clusters holding at least one pixel, i.e. colours left in the image.
    pub fn non_empty(&self) -> usize {
        self.distribution.iter().filter(|&&n| n != 0).count()
    }

    pub fn max_occupancy(&self) -> usize {
        self.distribution.iter().copied().max().unwrap_or(0)
    }

    /// Mean distance between a pixel and its cluster's centroid.
    ///
    /// `None` when no pixel was assigned.
    pub fn average_distance(&self) -> Option<f64> {
        match self.assigned() {
            0 => None,
            n => Some(self.total_distance / n as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats(distribution: Vec<usize>, total_distance: f64) -> EpochStats {
        EpochStats {
            epoch: 1,
            distribution,
            total_distance,
        }
    }

    #[test]
    fn summary_values() {
        let s = stats(vec![0, 3, 0, 5], 16.0);
        assert_eq!(s.assigned(), 8);
        assert_eq!(s.non_empty(), 2);
        assert_eq!(s.max_occupancy(), 5);
        assert_eq!(s.average_distance(), Some(2.0));
    }

    #[test]
    fn degenerate_average_is_none() {
        let s = stats(vec![0, 0, 0], 0.0);
        assert_eq!(s.average_distance(), None);
        assert_eq!(s.non_empty(), 0);
        assert_eq!(s.max_occupancy(), 0);

        assert_eq!(stats(vec![], 0.0).average_distance(), None);
    }
}
