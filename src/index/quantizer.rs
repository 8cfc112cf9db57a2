//! Coarse quantizer: seeded k-means clustering over a vector corpus.

use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecSearchError};
use crate::vector::topk::select_top_k;
use crate::vector::{DistanceBackend, Neighbor, VectorCorpus};

/// Parameters controlling k-means training.
///
/// The random seed is an explicit input so that training is reproducible:
/// identical samples, parameters, and seed always produce identical
/// centroids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Number of centroids (clusters) to produce.
    pub clusters: usize,
    /// Iteration cap for the assign/update loop.
    pub max_iterations: usize,
    /// Mean centroid movement below which training stops early.
    pub tolerance: f32,
    /// Seed for centroid initialization.
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            clusters: 100,
            max_iterations: 100,
            tolerance: 1e-6,
            seed: 0,
        }
    }
}

impl KMeansParams {
    /// Parameters for a given cluster count, other fields defaulted.
    pub fn with_clusters(clusters: usize) -> Self {
        Self {
            clusters,
            ..Self::default()
        }
    }
}

/// A trained set of centroids partitioning vector space.
///
/// Trained once, immutable afterwards; must be retrained if the corpus
/// changes materially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantizer {
    centroids: VectorCorpus,
    backend: DistanceBackend,
}

impl Quantizer {
    /// Train centroids on the given samples with seeded k-means.
    ///
    /// Fails with `InsufficientTrainingData` when there are fewer samples
    /// than requested clusters; no partial quantizer is produced.
    pub fn train(
        samples: &VectorCorpus,
        params: &KMeansParams,
        backend: DistanceBackend,
    ) -> Result<Self> {
        if params.clusters == 0 {
            return Err(SpecSearchError::invalid_operation(
                "cluster count must be non-zero",
            ));
        }
        if samples.len() < params.clusters {
            return Err(SpecSearchError::InsufficientTrainingData {
                samples: samples.len(),
                clusters: params.clusters,
            });
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut centroids = init_kmeans_plus_plus(samples, params.clusters, backend, &mut rng)?;

        for _ in 0..params.max_iterations {
            let assignments = assign_to_nearest(samples, &centroids, backend);
            let updated = recompute_centroids(samples, &centroids, &assignments)?;

            let movement = mean_movement(&centroids, &updated, backend);
            centroids = updated;
            if movement < params.tolerance {
                break;
            }
        }

        Ok(Self { centroids, backend })
    }

    /// Number of centroids.
    pub fn num_centroids(&self) -> usize {
        self.centroids.len()
    }

    /// Vector dimension of the centroids.
    pub fn dimension(&self) -> usize {
        self.centroids.dimension()
    }

    /// Borrow the centroid matrix.
    pub fn centroids(&self) -> &VectorCorpus {
        &self.centroids
    }

    /// Index of the nearest centroid (ties go to the lowest index).
    pub fn nearest(&self, vector: &[f32]) -> usize {
        nearest_centroid(vector, &self.centroids, self.backend)
    }

    /// Indices of the `n` nearest centroids, ascending by distance.
    pub fn nearest_n(&self, vector: &[f32], n: usize) -> Vec<usize> {
        let candidates = self.centroids.iter().map(|(id, row)| Neighbor {
            distance: self.backend.squared_l2(vector, row),
            id,
        });
        select_top_k(candidates, n)
            .into_iter()
            .map(|neighbor| neighbor.id)
            .collect()
    }
}

/// k-means++ initialization: first centroid uniform, the rest weighted by
/// squared distance to the nearest centroid chosen so far.
fn init_kmeans_plus_plus(
    samples: &VectorCorpus,
    clusters: usize,
    backend: DistanceBackend,
    rng: &mut StdRng,
) -> Result<VectorCorpus> {
    let mut centroids = VectorCorpus::new(samples.dimension());

    let first = rng.random_range(0..samples.len());
    centroids.push(samples.row(first))?;

    // Squared distance from each sample to its nearest chosen centroid,
    // updated incrementally as centroids are added.
    let mut best_dist: Vec<f32> = samples
        .iter()
        .map(|(_, row)| backend.squared_l2(row, samples.row(first)))
        .collect();

    while centroids.len() < clusters {
        let total_weight: f32 = best_dist.iter().sum();
        let chosen = if total_weight > 0.0 {
            let target = rng.random::<f32>() * total_weight;
            let mut cumsum = 0.0;
            let mut chosen = samples.len() - 1;
            for (i, &weight) in best_dist.iter().enumerate() {
                cumsum += weight;
                if cumsum >= target {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // All remaining samples coincide with a centroid.
            rng.random_range(0..samples.len())
        };

        centroids.push(samples.row(chosen))?;
        for (i, (_, row)) in samples.iter().enumerate() {
            let dist = backend.squared_l2(row, samples.row(chosen));
            if dist < best_dist[i] {
                best_dist[i] = dist;
            }
        }
    }

    Ok(centroids)
}

fn nearest_centroid(vector: &[f32], centroids: &VectorCorpus, backend: DistanceBackend) -> usize {
    let mut best_cluster = 0;
    let mut best_distance = f32::INFINITY;
    for (i, centroid) in centroids.iter() {
        let distance = backend.squared_l2(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best_cluster = i;
        }
    }
    best_cluster
}

/// Assign each sample to its nearest centroid, in parallel for large inputs.
fn assign_to_nearest(
    samples: &VectorCorpus,
    centroids: &VectorCorpus,
    backend: DistanceBackend,
) -> Vec<usize> {
    if samples.len() > 1000 {
        (0..samples.len())
            .into_par_iter()
            .map(|i| nearest_centroid(samples.row(i), centroids, backend))
            .collect()
    } else {
        samples
            .iter()
            .map(|(_, row)| nearest_centroid(row, centroids, backend))
            .collect()
    }
}

/// Recompute each centroid as the mean of its assigned samples.
/// A cluster with no members keeps its previous centroid.
fn recompute_centroids(
    samples: &VectorCorpus,
    previous: &VectorCorpus,
    assignments: &[usize],
) -> Result<VectorCorpus> {
    let clusters = previous.len();
    let dimension = previous.dimension();

    let mut sums = vec![0.0f64; clusters * dimension];
    let mut counts = vec![0usize; clusters];

    for (i, (_, row)) in samples.iter().enumerate() {
        let cluster = assignments[i];
        counts[cluster] += 1;
        let offset = cluster * dimension;
        for (j, &value) in row.iter().enumerate() {
            sums[offset + j] += value as f64;
        }
    }

    let mut updated = VectorCorpus::new(dimension);
    for cluster in 0..clusters {
        if counts[cluster] == 0 {
            updated.push(previous.row(cluster))?;
            continue;
        }
        let offset = cluster * dimension;
        let mean: Vec<f32> = sums[offset..offset + dimension]
            .iter()
            .map(|&s| (s / counts[cluster] as f64) as f32)
            .collect();
        updated.push(&mean)?;
    }

    Ok(updated)
}

fn mean_movement(old: &VectorCorpus, new: &VectorCorpus, backend: DistanceBackend) -> f32 {
    let total: f32 = old
        .iter()
        .zip(new.iter())
        .map(|((_, a), (_, b))| backend.squared_l2(a, b).sqrt())
        .sum();
    total / old.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blob_corpus() -> VectorCorpus {
        let mut rows = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f32 * 0.01;
            rows.push(vec![0.0 + jitter, 0.0]);
            rows.push(vec![10.0 + jitter, 10.0]);
        }
        VectorCorpus::from_rows(&rows, 2).unwrap()
    }

    #[test]
    fn test_insufficient_training_data() {
        let samples = VectorCorpus::from_rows(&[vec![1.0], vec![2.0]], 1).unwrap();
        let params = KMeansParams::with_clusters(3);
        let err = Quantizer::train(&samples, &params, DistanceBackend::Scalar).unwrap_err();
        assert!(matches!(
            err,
            SpecSearchError::InsufficientTrainingData {
                samples: 2,
                clusters: 3
            }
        ));
    }

    #[test]
    fn test_separates_well_spread_blobs() {
        let samples = two_blob_corpus();
        let params = KMeansParams {
            clusters: 2,
            seed: 42,
            ..KMeansParams::default()
        };
        let quantizer = Quantizer::train(&samples, &params, DistanceBackend::Scalar).unwrap();

        assert_eq!(quantizer.num_centroids(), 2);
        let near_origin = quantizer.nearest(&[0.1, 0.1]);
        let near_far = quantizer.nearest(&[9.9, 10.1]);
        assert_ne!(near_origin, near_far);
    }

    #[test]
    fn test_same_seed_reproduces_centroids() {
        let samples = two_blob_corpus();
        let params = KMeansParams {
            clusters: 4,
            seed: 7,
            ..KMeansParams::default()
        };
        let a = Quantizer::train(&samples, &params, DistanceBackend::Scalar).unwrap();
        let b = Quantizer::train(&samples, &params, DistanceBackend::Scalar).unwrap();
        assert_eq!(a.centroids(), b.centroids());
    }

    #[test]
    fn test_nearest_n_is_sorted_by_distance() {
        let samples = two_blob_corpus();
        let params = KMeansParams {
            clusters: 4,
            seed: 3,
            ..KMeansParams::default()
        };
        let quantizer = Quantizer::train(&samples, &params, DistanceBackend::Scalar).unwrap();

        let query = [0.0, 0.0];
        let probed = quantizer.nearest_n(&query, 4);
        assert_eq!(probed.len(), 4);
        let distances: Vec<f32> = probed
            .iter()
            .map(|&c| squared(&query, quantizer.centroids().row(c)))
            .collect();
        for pair in distances.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    fn squared(a: &[f32], b: &[f32]) -> f32 {
        crate::vector::squared_l2(a, b)
    }

    #[test]
    fn test_clusters_equal_to_samples_is_allowed() {
        let samples = VectorCorpus::from_rows(&[vec![0.0], vec![5.0], vec![9.0]], 1).unwrap();
        let params = KMeansParams {
            clusters: 3,
            seed: 1,
            ..KMeansParams::default()
        };
        let quantizer = Quantizer::train(&samples, &params, DistanceBackend::Scalar).unwrap();
        assert_eq!(quantizer.num_centroids(), 3);
    }
}
