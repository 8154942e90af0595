use crate::point::ColourPoint;
use std::fmt;

/// A centroid plus the points assigned to it during the current epoch.
#[derive(Debug, Clone)]
pub struct Cluster {
    centroid: ColourPoint,
    members: Vec<ColourPoint>,
}

impl Cluster {
    pub fn new(centroid: ColourPoint) -> Self {
        Self {
            centroid: ColourPoint { position: None, ..centroid },
            members: Vec::new(),
        }
    }

    #[inline]
    pub fn append(&mut self, point: ColourPoint) {
        self.members.push(point);
    }

    /// Moves the centroid to the truncated mean of the current members.
    ///
    /// A cluster without members keeps its previous centroid, so it can still
    /// attract pixels in later epochs.
    pub fn recompute_centroid(&mut self) {
        if self.members.is_empty() {
            return;
        }

        let n = self.members.len() as i64;
        let (mut r, mut g, mut b) = (0i64, 0i64, 0i64);
        for p in &self.members {
            r += i64::from(p.red);
            g += i64::from(p.green);
            b += i64::from(p.blue);
        }

        // Integer division truncates towards zero, like the channel constructor.
        self.centroid = ColourPoint::new((r / n) as i32, (g / n) as i32, (b / n) as i32);
    }

    /// Recomputes the centroid from the members, then drops the members.
    ///
    /// Must run in this order: the members are the only record of the previous
    /// epoch's assignment.
    pub fn clear_keep_position(&mut self) {
        self.recompute_centroid();
        self.members.clear();
    }

    #[inline]
    pub fn mean_value(&self) -> ColourPoint {
        self.centroid
    }

    #[inline]
    pub fn occupancy(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[ColourPoint] {
        &self.members
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Cluster @{}>", self.centroid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recompute_uses_truncated_mean() {
        let mut cluster = Cluster::new(ColourPoint::new(0, 0, 0));
        cluster.append(ColourPoint::new(10, 0, 255));
        cluster.append(ColourPoint::new(11, 1, 254));
        cluster.append(ColourPoint::new(11, 1, 254));

        cluster.recompute_centroid();

        // (32/3, 2/3, 763/3)
        assert_eq!(cluster.mean_value(), ColourPoint::new(10, 0, 254));
        assert_eq!(cluster.occupancy(), 3);
    }

    #[test]
    fn empty_cluster_keeps_centroid() {
        let mut cluster = Cluster::new(ColourPoint::new(42, 43, 44));
        cluster.recompute_centroid();
        assert_eq!(cluster.mean_value(), ColourPoint::new(42, 43, 44));

        cluster.clear_keep_position();
        assert_eq!(cluster.mean_value(), ColourPoint::new(42, 43, 44));
        assert_eq!(cluster.occupancy(), 0);
    }

    #[test]
    fn clear_recomputes_before_emptying() {
        let mut cluster = Cluster::new(ColourPoint::new(0, 0, 0));
        cluster.append(ColourPoint::new(100, 100, 100).at(0, 0));
        cluster.append(ColourPoint::new(200, 200, 200).at(0, 1));

        cluster.clear_keep_position();

        assert!(cluster.members().is_empty());
        assert_eq!(cluster.mean_value(), ColourPoint::new(150, 150, 150));
    }

    #[test]
    fn members_keep_insertion_order() {
        let mut cluster = Cluster::new(ColourPoint::default());
        cluster.append(ColourPoint::new(1, 1, 1).at(0, 0));
        cluster.append(ColourPoint::new(2, 2, 2).at(0, 1));

        let cols: Vec<u32> = cluster
            .members()
            .iter()
            .filter_map(|p| p.position.map(|pos| pos.col))
            .collect();
        assert_eq!(cols, vec![0, 1]);
    }

    #[test]
    fn display() {
        let cluster = Cluster::new(ColourPoint::new(1, 2, 3));
        assert_eq!(cluster.to_string(), "<Cluster @(1, 2, 3)>");
    }
}
