//! Flat index: exact nearest-neighbor search by exhaustive comparison.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecSearchError};
use crate::index::{IndexKind, VectorIndex};
use crate::vector::topk::select_top_k;
use crate::vector::{DistanceBackend, Neighbor, VectorCorpus};

/// Exact nearest-neighbor index.
///
/// Every query is compared against every stored vector, so results are
/// exact and deterministic: identical inputs always yield identical output
/// ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    corpus: VectorCorpus,
    backend: DistanceBackend,
}

impl FlatIndex {
    /// Create an empty flat index with a fixed dimension.
    pub fn new(dimension: usize) -> Self {
        Self::with_backend(dimension, DistanceBackend::auto())
    }

    /// Create an empty flat index with an explicit distance backend.
    pub fn with_backend(dimension: usize, backend: DistanceBackend) -> Self {
        Self {
            corpus: VectorCorpus::new(dimension),
            backend,
        }
    }

    /// Borrow the backing corpus.
    pub fn corpus(&self) -> &VectorCorpus {
        &self.corpus
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.corpus.dimension()
    }

    fn len(&self) -> usize {
        self.corpus.len()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Flat
    }

    fn add(&mut self, vectors: &VectorCorpus) -> Result<()> {
        self.corpus.extend(vectors)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension() {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let candidates = self.corpus.iter().map(|(id, row)| Neighbor {
            distance: self.backend.squared_l2(query, row),
            id,
        });
        Ok(select_top_k(candidates, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        let corpus = VectorCorpus::from_rows(
            &[
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![5.0, 5.0],
            ],
            2,
        )
        .unwrap();
        let mut index = FlatIndex::new(2);
        index.add(&corpus).unwrap();
        index
    }

    #[test]
    fn test_exact_top_two_with_tie_break() {
        let index = sample_index();
        let result = index.search(&[0.0, 0.0], 2).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].distance, 0.0);
        assert_eq!(result[0].id, 0);
        // ids 1 and 2 are both at squared distance 1.0; lower id wins.
        assert_eq!(result[1].distance, 1.0);
        assert_eq!(result[1].id, 1);
    }

    #[test]
    fn test_distances_monotonically_non_decreasing() {
        let index = sample_index();
        let result = index.search(&[0.3, -0.2], 4).unwrap();
        for pair in result.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut index = FlatIndex::new(1);
        index
            .add(&VectorCorpus::from_rows(&[vec![1.0], vec![2.0]], 1).unwrap())
            .unwrap();
        index
            .add(&VectorCorpus::from_rows(&[vec![3.0]], 1).unwrap())
            .unwrap();

        let result = index.search(&[3.0], 1).unwrap();
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn test_add_rejects_wrong_dimension() {
        let mut index = FlatIndex::new(2);
        let corpus = VectorCorpus::from_rows(&[vec![1.0, 2.0, 3.0]], 3).unwrap();
        assert!(matches!(
            index.add(&corpus),
            Err(SpecSearchError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[0.0, 0.0, 0.0], 2),
            Err(SpecSearchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_scalar_and_simd_backends_return_same_ids() {
        let corpus = VectorCorpus::from_rows(
            &(0..50)
                .map(|i| (0..9).map(|j| ((i * 7 + j * 3) % 13) as f32).collect())
                .collect::<Vec<_>>(),
            9,
        )
        .unwrap();

        let mut scalar = FlatIndex::with_backend(9, DistanceBackend::Scalar);
        scalar.add(&corpus).unwrap();
        let mut simd = FlatIndex::with_backend(9, DistanceBackend::Simd);
        simd.add(&corpus).unwrap();

        let query = vec![1.0; 9];
        let a = scalar.search(&query, 5).unwrap();
        let b = simd.search(&query, 5).unwrap();
        let ids_a: Vec<usize> = a.iter().map(|n| n.id).collect();
        let ids_b: Vec<usize> = b.iter().map(|n| n.id).collect();
        assert_eq!(ids_a, ids_b);
    }
}
