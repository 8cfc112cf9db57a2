//! Partitioned (IVF-style) index: approximate search over a clustered corpus.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecSearchError};
use crate::index::quantizer::{KMeansParams, Quantizer};
use crate::index::{IndexKind, VectorIndex};
use crate::vector::topk::select_top_k;
use crate::vector::{DistanceBackend, Neighbor, VectorCorpus};

/// Default number of probed clusters per query.
pub const DEFAULT_NPROBE: usize = 1;

/// Approximate nearest-neighbor index.
///
/// The corpus is partitioned into clusters by a coarse quantizer; every
/// vector belongs to exactly one inverted list (the partition is total and
/// disjoint). A search probes only the `nprobe` nearest clusters and
/// computes exact distances within them, so true nearest neighbors assigned
/// to unprobed clusters can be missed. That is the accuracy/speed tradeoff
/// this index exists for, not a defect; probing every cluster degenerates
/// to exact search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionedIndex {
    dimension: usize,
    nprobe: usize,
    quantizer: Option<Quantizer>,
    /// One list of corpus ids per centroid; some lists may be empty.
    lists: Vec<Vec<usize>>,
    corpus: VectorCorpus,
    backend: DistanceBackend,
}

impl PartitionedIndex {
    /// Create an untrained partitioned index with a fixed dimension.
    pub fn new(dimension: usize) -> Self {
        Self::with_backend(dimension, DistanceBackend::auto())
    }

    /// Create an untrained partitioned index with an explicit backend.
    pub fn with_backend(dimension: usize, backend: DistanceBackend) -> Self {
        Self {
            dimension,
            nprobe: DEFAULT_NPROBE,
            quantizer: None,
            lists: Vec::new(),
            corpus: VectorCorpus::new(dimension),
            backend,
        }
    }

    /// Train the coarse quantizer on the given samples.
    ///
    /// Fails with `InsufficientTrainingData` when there are fewer samples
    /// than clusters. Retraining an index that already holds vectors is
    /// rejected: the inverted lists would no longer match the centroids.
    pub fn train(&mut self, samples: &VectorCorpus, params: &KMeansParams) -> Result<()> {
        if samples.dimension() != self.dimension {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.dimension,
                actual: samples.dimension(),
            });
        }
        if !self.corpus.is_empty() {
            return Err(SpecSearchError::invalid_operation(
                "cannot retrain a partitioned index that already holds vectors",
            ));
        }

        let quantizer = Quantizer::train(samples, params, self.backend)?;
        self.lists = vec![Vec::new(); quantizer.num_centroids()];
        self.quantizer = Some(quantizer);
        Ok(())
    }

    /// Whether the quantizer has been trained.
    pub fn is_trained(&self) -> bool {
        self.quantizer.is_some()
    }

    /// Number of clusters (centroids).
    pub fn num_clusters(&self) -> usize {
        self.quantizer
            .as_ref()
            .map(Quantizer::num_centroids)
            .unwrap_or(0)
    }

    /// Number of clusters probed per query.
    pub fn nprobe(&self) -> usize {
        self.nprobe
    }

    /// Set the number of clusters probed per query (min 1).
    ///
    /// Larger values trade speed for recall.
    pub fn set_nprobe(&mut self, nprobe: usize) {
        self.nprobe = nprobe.max(1);
    }

    /// Borrow the inverted lists (one per centroid).
    pub fn lists(&self) -> &[Vec<usize>] {
        &self.lists
    }
}

impl VectorIndex for PartitionedIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.corpus.len()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Partitioned
    }

    fn add(&mut self, vectors: &VectorCorpus) -> Result<()> {
        let quantizer = self
            .quantizer
            .as_ref()
            .ok_or_else(|| SpecSearchError::not_trained("add requires a trained quantizer"))?;
        if vectors.dimension() != self.dimension {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.dimension,
                actual: vectors.dimension(),
            });
        }

        let next_id = self.corpus.len();
        for (offset, row) in vectors.iter() {
            let cluster = quantizer.nearest(row);
            self.lists[cluster].push(next_id + offset);
        }
        self.corpus.extend(vectors)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let quantizer = self
            .quantizer
            .as_ref()
            .ok_or_else(|| SpecSearchError::not_trained("search requires a trained quantizer"))?;
        if query.len() != self.dimension {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let probed = quantizer.nearest_n(query, self.nprobe);
        let candidates = probed
            .iter()
            .flat_map(|&cluster| self.lists[cluster].iter())
            .map(|&id| Neighbor {
                distance: self.backend.squared_l2(query, self.corpus.row(id)),
                id,
            });
        Ok(select_top_k(candidates, k))
    }
}
