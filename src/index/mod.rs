//! Index structures for k-nearest-neighbor search.
//!
//! Two index kinds are provided:
//! - [`FlatIndex`]: exact search by exhaustive comparison
//! - [`PartitionedIndex`]: approximate IVF-style search over a clustered
//!   corpus, probing only the nearest clusters
//!
//! [`IndexBuilder`] orchestrates construction and [`AnyIndex`] gives the
//! searcher and the persistence layer a single concrete type to hold.

pub mod builder;
pub mod flat;
pub mod ivf;
pub mod quantizer;

pub use builder::{BuildStage, IndexBuilder, ProgressObserver};
pub use flat::FlatIndex;
pub use ivf::PartitionedIndex;
pub use quantizer::{KMeansParams, Quantizer};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::{Neighbor, VectorCorpus};

/// The kind of index structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// Exact brute-force index.
    Flat,
    /// Approximate IVF-style index (coarse quantizer + inverted lists).
    Partitioned,
}

impl IndexKind {
    /// Get the name of this index kind.
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Flat => "flat",
            IndexKind::Partitioned => "partitioned",
        }
    }
}

/// Common contract of both index kinds.
///
/// `search` returns *squared* L2 distances sorted ascending with ties broken
/// by lowest id; converting to true Euclidean distance is the searcher's
/// job. Indexes are single-writer during `add`/training and safe for
/// concurrent readers afterwards.
pub trait VectorIndex: Send + Sync {
    /// The fixed vector dimension.
    fn dimension(&self) -> usize;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The kind tag of this index.
    fn kind(&self) -> IndexKind;

    /// Bulk-append vectors, assigning sequential ids starting at `len()`.
    fn add(&mut self, vectors: &VectorCorpus) -> Result<()>;

    /// Find up to k nearest neighbors of one query, by squared L2 distance.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// A built index of either kind, the unit of persistence and dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnyIndex {
    /// Exact index.
    Flat(FlatIndex),
    /// Approximate partitioned index.
    Partitioned(PartitionedIndex),
}

impl AnyIndex {
    /// Set the number of probed clusters on a partitioned index.
    ///
    /// No-op on a flat index, which always searches exhaustively.
    pub fn set_nprobe(&mut self, nprobe: usize) {
        if let AnyIndex::Partitioned(index) = self {
            index.set_nprobe(nprobe);
        }
    }
}

impl VectorIndex for AnyIndex {
    fn dimension(&self) -> usize {
        match self {
            AnyIndex::Flat(index) => index.dimension(),
            AnyIndex::Partitioned(index) => index.dimension(),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyIndex::Flat(index) => index.len(),
            AnyIndex::Partitioned(index) => index.len(),
        }
    }

    fn kind(&self) -> IndexKind {
        match self {
            AnyIndex::Flat(index) => index.kind(),
            AnyIndex::Partitioned(index) => index.kind(),
        }
    }

    fn add(&mut self, vectors: &VectorCorpus) -> Result<()> {
        match self {
            AnyIndex::Flat(index) => index.add(vectors),
            AnyIndex::Partitioned(index) => index.add(vectors),
        }
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        match self {
            AnyIndex::Flat(index) => index.search(query, k),
            AnyIndex::Partitioned(index) => index.search(query, k),
        }
    }
}
