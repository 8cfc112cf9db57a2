//! The uniform query-time wrapper around a built index.

use rayon::prelude::*;

use crate::error::{Result, SpecSearchError};
use crate::index::{AnyIndex, VectorIndex};
use crate::search::results::ResultSet;
use crate::vector::{Neighbor, VectorCorpus};

/// Configuration for the searcher.
#[derive(Debug, Clone, Copy)]
pub struct SearcherConfig {
    /// Run batch queries under rayon. Per-query results are identical
    /// either way; only wall-clock time changes.
    pub parallel: bool,
    /// Minimum batch size before going parallel.
    pub parallel_threshold: usize,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 8,
        }
    }
}

/// Executes k-NN queries against a built index with a uniform contract.
///
/// Whatever the index kind, the searcher validates query dimensions, runs
/// the index's search, and converts each squared distance to true Euclidean
/// distance by taking its square root exactly once at this boundary.
/// Omitting that conversion would silently return wrong-scale distances,
/// so it lives here rather than in any index.
pub struct IndexSearcher<'a> {
    index: &'a AnyIndex,
    config: SearcherConfig,
}

impl<'a> IndexSearcher<'a> {
    /// Wrap a built index.
    pub fn new(index: &'a AnyIndex) -> Self {
        Self {
            index,
            config: SearcherConfig::default(),
        }
    }

    /// Wrap a built index with explicit configuration.
    pub fn with_config(index: &'a AnyIndex, config: SearcherConfig) -> Self {
        Self { index, config }
    }

    /// Run k-NN search for a batch of queries.
    ///
    /// Fails with `DimensionMismatch` if the query dimension differs from
    /// the index dimension, and with `EmptyIndex` when k > 0 is requested
    /// against an index of zero vectors. When 0 < N < k, the tail slots of
    /// each row are sentinel-padded instead.
    pub fn search(&self, queries: &VectorCorpus, k: usize) -> Result<ResultSet> {
        if queries.dimension() != self.index.dimension() {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: queries.dimension(),
            });
        }
        if self.index.is_empty() && k > 0 {
            return Err(SpecSearchError::empty_index(format!(
                "cannot search {} neighbors in an index of 0 vectors",
                k
            )));
        }

        let rows: Vec<Vec<(f32, i64)>> =
            if self.config.parallel && queries.len() >= self.config.parallel_threshold {
                (0..queries.len())
                    .into_par_iter()
                    .map(|q| self.search_one(queries.row(q), k))
                    .collect::<Result<_>>()?
            } else {
                (0..queries.len())
                    .map(|q| self.search_one(queries.row(q), k))
                    .collect::<Result<_>>()?
            };

        let mut results = ResultSet::new(k);
        for row in &rows {
            results.push_row(row);
        }
        Ok(results)
    }

    fn search_one(&self, query: &[f32], k: usize) -> Result<Vec<(f32, i64)>> {
        let neighbors = self.index.search(query, k)?;
        Ok(neighbors
            .into_iter()
            .map(|Neighbor { distance, id }| (distance.sqrt(), id as i64))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FlatIndex, IndexBuilder, IndexKind};
    use crate::search::results::NO_NEIGHBOR;

    fn built_flat() -> AnyIndex {
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
        IndexBuilder::new(IndexKind::Flat).build(&corpus).unwrap()
    }

    #[test]
    fn test_distances_are_euclidean_not_squared() {
        let index = built_flat();
        let searcher = IndexSearcher::new(&index);
        let queries = VectorCorpus::from_rows(&[vec![0.0, 0.0]], 2).unwrap();

        let results = searcher.search(&queries, 4).unwrap();
        let distances = results.distances_row(0);
        // [5,5] is at squared distance 50; Euclidean is sqrt(50).
        assert!((distances[3] - 50.0f32.sqrt()).abs() < 1e-5);
        assert_eq!(results.ids_row(0), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_single_vector_corpus_pads_to_k() {
        let corpus = VectorCorpus::from_rows(&[vec![1.0, 2.0]], 2).unwrap();
        let index = IndexBuilder::new(IndexKind::Flat).build(&corpus).unwrap();
        let searcher = IndexSearcher::new(&index);
        let queries = VectorCorpus::from_rows(&[vec![0.0, 0.0]], 2).unwrap();

        let results = searcher.search(&queries, 5).unwrap();
        let ids = results.ids_row(0);
        assert_eq!(ids[0], 0);
        assert_eq!(&ids[1..], &[NO_NEIGHBOR; 4]);
    }

    #[test]
    fn test_empty_index_with_positive_k_fails() {
        let index = AnyIndex::Flat(FlatIndex::new(2));
        let searcher = IndexSearcher::new(&index);
        let queries = VectorCorpus::from_rows(&[vec![0.0, 0.0]], 2).unwrap();

        assert!(matches!(
            searcher.search(&queries, 1),
            Err(SpecSearchError::EmptyIndex(_))
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = built_flat();
        let searcher = IndexSearcher::new(&index);
        let queries = VectorCorpus::from_rows(&[vec![0.0, 0.0, 0.0]], 3).unwrap();

        assert!(matches!(
            searcher.search(&queries, 2),
            Err(SpecSearchError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let index = built_flat();
        let queries = VectorCorpus::from_rows(
            &(0..32)
                .map(|i| vec![(i % 6) as f32 * 0.5, (i % 4) as f32 * 0.25])
                .collect::<Vec<_>>(),
            2,
        )
        .unwrap();

        let sequential = IndexSearcher::with_config(
            &index,
            SearcherConfig {
                parallel: false,
                ..SearcherConfig::default()
            },
        )
        .search(&queries, 3)
        .unwrap();
        let parallel = IndexSearcher::new(&index).search(&queries, 3).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_empty_query_batch() {
        let index = built_flat();
        let searcher = IndexSearcher::new(&index);
        let queries = VectorCorpus::new(2);

        let results = searcher.search(&queries, 3).unwrap();
        assert_eq!(results.num_queries(), 0);
    }
}
