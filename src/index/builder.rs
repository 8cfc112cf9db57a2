//! Index construction orchestration.
//!
//! The builder is the only component aware of the kind-selection policy:
//! it constructs the requested index kind, trains it when required, inserts
//! the whole corpus, and hands back an [`AnyIndex`] ready for persistence
//! or immediate search.

use std::sync::Arc;

use crate::error::Result;
use crate::index::flat::FlatIndex;
use crate::index::ivf::PartitionedIndex;
use crate::index::quantizer::KMeansParams;
use crate::index::{AnyIndex, IndexKind, VectorIndex};
use crate::vector::{DistanceBackend, VectorCorpus};

/// Build phases reported to a progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// k-means training of the coarse quantizer.
    Training,
    /// Bulk insertion of corpus vectors.
    Inserting,
}

/// Optional observer the builder reports progress to.
///
/// Reporting has no effect on correctness; the default is no observer.
pub trait ProgressObserver: Send + Sync {
    /// Called when a stage completes, with the number of vectors involved.
    fn on_stage_complete(&self, stage: BuildStage, vectors: usize);
}

/// Orchestrates index construction for a corpus.
pub struct IndexBuilder {
    kind: IndexKind,
    clusters: Option<usize>,
    nprobe: usize,
    seed: u64,
    backend: DistanceBackend,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl IndexBuilder {
    /// Create a builder for the given index kind.
    pub fn new(kind: IndexKind) -> Self {
        Self {
            kind,
            clusters: None,
            nprobe: crate::index::ivf::DEFAULT_NPROBE,
            seed: 0,
            backend: DistanceBackend::auto(),
            observer: None,
        }
    }

    /// Override the cluster count for the partitioned kind.
    ///
    /// Without an override the count is chosen proportional to corpus size.
    pub fn clusters(mut self, clusters: usize) -> Self {
        self.clusters = Some(clusters);
        self
    }

    /// Set the default number of probed clusters on the built index.
    pub fn nprobe(mut self, nprobe: usize) -> Self {
        self.nprobe = nprobe;
        self
    }

    /// Set the training seed (partitioned kind only).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Select an explicit distance backend.
    pub fn backend(mut self, backend: DistanceBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Install a progress observer.
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build an index over the corpus: construct, train if required, insert.
    pub fn build(&self, corpus: &VectorCorpus) -> Result<AnyIndex> {
        let mut index = match self.kind {
            IndexKind::Flat => AnyIndex::Flat(FlatIndex::with_backend(
                corpus.dimension(),
                self.backend,
            )),
            IndexKind::Partitioned => {
                let mut index =
                    PartitionedIndex::with_backend(corpus.dimension(), self.backend);
                let params = KMeansParams {
                    clusters: self
                        .clusters
                        .unwrap_or_else(|| default_clusters(corpus.len())),
                    seed: self.seed,
                    ..KMeansParams::default()
                };
                index.train(corpus, &params)?;
                index.set_nprobe(self.nprobe);
                self.report(BuildStage::Training, corpus.len());
                AnyIndex::Partitioned(index)
            }
        };

        index.add(corpus)?;
        self.report(BuildStage::Inserting, corpus.len());
        Ok(index)
    }

    fn report(&self, stage: BuildStage, vectors: usize) {
        if let Some(observer) = &self.observer {
            observer.on_stage_complete(stage, vectors);
        }
    }
}

/// Default cluster count for a corpus of n vectors: sqrt(n), clamped to
/// sane bounds and never above n.
pub fn default_clusters(n: usize) -> usize {
    let clusters = (n as f64).sqrt() as usize;
    clusters.clamp(1, 10000).min(n.max(1))
}
