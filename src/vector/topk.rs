//! Exact partial top-k selection.
//!
//! Selection keeps the k smallest `(distance, id)` pairs seen so far in a
//! bounded max-heap, so a full sort of the candidate set is never needed.
//! Ordering is total: by distance ascending, then by id ascending, which
//! makes tie-breaks deterministic (lowest corpus id wins).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One candidate neighbor: squared distance plus corpus id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Squared L2 distance from the query.
    pub distance: f32,
    /// Zero-based corpus id.
    pub id: usize,
}

impl Eq for Neighbor {}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        // Distances are finite (corpora reject NaN/inf), so total_cmp
        // matches the usual numeric order here.
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the k smallest candidates, sorted ascending by (distance, id).
///
/// Returns fewer than k entries when the candidate stream is shorter than k.
pub fn select_top_k(candidates: impl Iterator<Item = Neighbor>, k: usize) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }

    // Max-heap of the k best so far; the root is the current worst.
    let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);
    for candidate in candidates {
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek() {
            if candidate < *worst {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    let mut result = heap.into_vec();
    result.sort_unstable();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(pairs: &[(f32, usize)]) -> Vec<Neighbor> {
        pairs
            .iter()
            .map(|&(distance, id)| Neighbor { distance, id })
            .collect()
    }

    #[test]
    fn test_selects_k_smallest_in_ascending_order() {
        let candidates = neighbors(&[(4.0, 0), (1.0, 1), (9.0, 2), (0.5, 3), (2.0, 4)]);
        let top = select_top_k(candidates.into_iter(), 3);
        assert_eq!(top, neighbors(&[(0.5, 3), (1.0, 1), (2.0, 4)]));
    }

    #[test]
    fn test_ties_broken_by_lowest_id() {
        let candidates = neighbors(&[(1.0, 5), (1.0, 2), (1.0, 9), (3.0, 0)]);
        let top = select_top_k(candidates.into_iter(), 2);
        assert_eq!(top, neighbors(&[(1.0, 2), (1.0, 5)]));
    }

    #[test]
    fn test_fewer_candidates_than_k() {
        let candidates = neighbors(&[(2.0, 0), (1.0, 1)]);
        let top = select_top_k(candidates.into_iter(), 5);
        assert_eq!(top, neighbors(&[(1.0, 1), (2.0, 0)]));
    }

    #[test]
    fn test_k_zero_is_empty() {
        let candidates = neighbors(&[(2.0, 0)]);
        assert!(select_top_k(candidates.into_iter(), 0).is_empty());
    }

    #[test]
    fn test_tie_at_the_heap_boundary_keeps_lower_id() {
        // Same distance as the current worst but a higher id must not evict.
        let candidates = neighbors(&[(1.0, 1), (1.0, 7)]);
        let top = select_top_k(candidates.into_iter(), 1);
        assert_eq!(top, neighbors(&[(1.0, 1)]));

        // Same distance but a lower id must evict.
        let candidates = neighbors(&[(1.0, 7), (1.0, 1)]);
        let top = select_top_k(candidates.into_iter(), 1);
        assert_eq!(top, neighbors(&[(1.0, 1)]));
    }
}
