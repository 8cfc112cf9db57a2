//! Per-query neighbor lists produced by a search.

use serde::{Deserialize, Serialize};

/// Sentinel id marking an unfilled result slot (fewer than k neighbors).
pub const NO_NEIGHBOR: i64 = -1;

/// A Q×k matrix of (distance, corpus-id) pairs, one row per query.
///
/// Rows are sorted ascending by distance with ties broken by lowest id.
/// Distances are true Euclidean (the searcher applies the square root);
/// slots beyond the number of available neighbors hold `NO_NEIGHBOR` and an
/// infinite distance. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    k: usize,
    distances: Vec<f32>,
    ids: Vec<i64>,
}

impl ResultSet {
    /// Create an empty result set for searches with the given k.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            distances: Vec::new(),
            ids: Vec::new(),
        }
    }

    /// Assemble a result set from row-major matrices.
    pub(crate) fn from_parts(k: usize, distances: Vec<f32>, ids: Vec<i64>) -> Self {
        debug_assert_eq!(distances.len(), ids.len());
        debug_assert!(k == 0 || distances.len() % k == 0);
        Self { k, distances, ids }
    }

    /// Append one query's row, padding unfilled slots with sentinels.
    pub(crate) fn push_row(&mut self, row: &[(f32, i64)]) {
        debug_assert!(row.len() <= self.k);
        for &(distance, id) in row {
            self.distances.push(distance);
            self.ids.push(id);
        }
        for _ in row.len()..self.k {
            self.distances.push(f32::INFINITY);
            self.ids.push(NO_NEIGHBOR);
        }
    }

    /// Number of queries (rows).
    pub fn num_queries(&self) -> usize {
        if self.k == 0 { 0 } else { self.distances.len() / self.k }
    }

    /// The k parameter the search was issued with.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Distances of one query's row.
    pub fn distances_row(&self, query: usize) -> &[f32] {
        &self.distances[query * self.k..(query + 1) * self.k]
    }

    /// Corpus ids of one query's row (`NO_NEIGHBOR` for unfilled slots).
    pub fn ids_row(&self, query: usize) -> &[i64] {
        &self.ids[query * self.k..(query + 1) * self.k]
    }

    /// The full row-major distance matrix.
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// The full row-major id matrix.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_pads_with_sentinels() {
        let mut results = ResultSet::new(3);
        results.push_row(&[(0.5, 2)]);

        assert_eq!(results.num_queries(), 1);
        assert_eq!(results.ids_row(0), &[2, NO_NEIGHBOR, NO_NEIGHBOR]);
        assert_eq!(results.distances_row(0)[0], 0.5);
        assert!(results.distances_row(0)[1].is_infinite());
    }

    #[test]
    fn test_row_accessors() {
        let mut results = ResultSet::new(2);
        results.push_row(&[(0.0, 0), (1.0, 1)]);
        results.push_row(&[(2.0, 3), (4.0, 0)]);

        assert_eq!(results.num_queries(), 2);
        assert_eq!(results.distances_row(1), &[2.0, 4.0]);
        assert_eq!(results.ids_row(1), &[3, 0]);
        assert_eq!(results.ids().len(), 4);
    }
}
