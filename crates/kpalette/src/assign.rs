use crate::InputImage;
use crate::cluster::Cluster;
use crate::point::ColourPoint;
use rayon::prelude::*;

/// Finds the cluster whose centroid is closest to `point`.
///
/// Returns the cluster index and the Euclidean distance, or `None` if there are no
/// clusters. On ties the first cluster in scan order wins.
#[inline]
pub fn nearest_cluster(point: ColourPoint, clusters: &[Cluster]) -> Option<(usize, f64)> {
    let mut min = i64::MAX;
    let mut min_idx = None;
    for (i, cluster) in clusters.iter().enumerate() {
        let d = cluster.mean_value().squared_distance(point);
        if d < min {
            min = d;
            min_idx = Some(i);
        }
    }

    min_idx.map(|i| (i, (min as f64).sqrt()))
}

/// Assigns every pixel of `image` to its nearest cluster and returns the summed
/// assignment distance.
///
/// Clusters are expected to be cleared beforehand. With `parallel` set, the nearest
/// cluster of every pixel is computed on the rayon pool first and the results are
/// appended in scan order afterwards, so the outcome matches the sequential scan.
pub fn assign_image(image: &InputImage, clusters: &mut [Cluster], parallel: bool) -> f64 {
    if parallel {
        assign_parallel(image, clusters)
    } else {
        assign_sequential(image, clusters)
    }
}

fn assign_sequential(image: &InputImage, clusters: &mut [Cluster]) -> f64 {
    let mut total_distance = 0.0;
    for point in image.points() {
        if let Some((idx, distance)) = nearest_cluster(point, clusters) {
            clusters[idx].append(point);
            total_distance += distance;
        }
    }
    total_distance
}

fn assign_parallel(image: &InputImage, clusters: &mut [Cluster]) -> f64 {
    let nearest: Vec<Option<(usize, f64)>> = {
        let clusters: &[Cluster] = clusters;
        (0..image.pixel_count())
            .into_par_iter()
            .map(|i| nearest_cluster(image.point(i), clusters))
            .collect()
    };

    let mut total_distance = 0.0;
    for (i, assignment) in nearest.into_iter().enumerate() {
        if let Some((idx, distance)) = assignment {
            clusters[idx].append(image.point(i));
            total_distance += distance;
        }
    }
    total_distance
}
