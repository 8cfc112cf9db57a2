//! Contiguous row-major storage for fixed-dimension vectors.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecSearchError};

/// An immutable collection of fixed-dimension f32 vectors.
///
/// Vectors are stored contiguously in row-major order. Each vector is
/// implicitly identified by its zero-based insertion position (its
/// "spectrum id"). The corpus is filled once at build time and treated as
/// read-only thereafter; concurrent reads are safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorCorpus {
    data: Vec<f32>,
    dimension: usize,
}

impl VectorCorpus {
    /// Create an empty corpus with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            data: Vec::new(),
            dimension,
        }
    }

    /// Create a corpus from a flat row-major buffer.
    ///
    /// Fails with `DimensionMismatch` if the buffer length is not a multiple
    /// of `dimension`, and with `Corrupt` if any value is NaN or infinite.
    pub fn from_flat(data: Vec<f32>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(SpecSearchError::invalid_operation(
                "vector dimension must be non-zero",
            ));
        }
        if data.len() % dimension != 0 {
            return Err(SpecSearchError::DimensionMismatch {
                expected: dimension,
                actual: data.len() % dimension,
            });
        }
        if !data.iter().all(|x| x.is_finite()) {
            return Err(SpecSearchError::corrupt(
                "vector data contains NaN or infinite values",
            ));
        }
        Ok(Self { data, dimension })
    }

    /// Create a corpus from individual rows.
    pub fn from_rows(rows: &[Vec<f32>], dimension: usize) -> Result<Self> {
        let mut corpus = Self::new(dimension);
        for row in rows {
            corpus.push(row)?;
        }
        Ok(corpus)
    }

    /// Append one vector, assigning it the next sequential id.
    ///
    /// Fails with `DimensionMismatch` if the row length differs from the
    /// corpus dimension; the corpus is left unchanged on error.
    pub fn push(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dimension {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.dimension,
                actual: row.len(),
            });
        }
        if !row.iter().all(|x| x.is_finite()) {
            return Err(SpecSearchError::corrupt(
                "vector data contains NaN or infinite values",
            ));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Append every vector of another corpus, preserving order.
    pub fn extend(&mut self, other: &VectorCorpus) -> Result<()> {
        if other.dimension != self.dimension {
            return Err(SpecSearchError::DimensionMismatch {
                expected: self.dimension,
                actual: other.dimension,
            });
        }
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    /// Number of vectors stored.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the corpus holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The fixed dimension shared by every vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Borrow the vector with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id >= self.len()`.
    pub fn row(&self, id: usize) -> &[f32] {
        let start = id * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Iterate over `(id, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.data
            .chunks_exact(self.dimension)
            .enumerate()
    }

    /// Borrow the underlying row-major buffer.
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_row_access() {
        let mut corpus = VectorCorpus::new(2);
        corpus.push(&[1.0, 2.0]).unwrap();
        corpus.push(&[3.0, 4.0]).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.row(0), &[1.0, 2.0]);
        assert_eq!(corpus.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_push_wrong_dimension_leaves_corpus_unchanged() {
        let mut corpus = VectorCorpus::new(3);
        corpus.push(&[1.0, 2.0, 3.0]).unwrap();

        let err = corpus.push(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            SpecSearchError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_from_flat_validates_length() {
        assert!(VectorCorpus::from_flat(vec![1.0, 2.0, 3.0], 2).is_err());
        let corpus = VectorCorpus::from_flat(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(VectorCorpus::from_flat(vec![1.0, f32::NAN], 2).is_err());

        let mut corpus = VectorCorpus::new(1);
        assert!(corpus.push(&[f32::INFINITY]).is_err());
    }

    #[test]
    fn test_iter_yields_ids_in_insertion_order() {
        let corpus =
            VectorCorpus::from_rows(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]], 2).unwrap();
        let ids: Vec<usize> = corpus.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
