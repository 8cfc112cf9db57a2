//! Squared-L2 distance kernels.
//!
//! The squared distance is what the indexes rank by; the square root is
//! applied once at the searcher boundary. Two kernels are available behind
//! [`DistanceBackend`]: a scalar reference implementation and a SIMD
//! implementation built on `wide` f32x8 lanes. Both are pure functions and
//! safe to call concurrently; they agree up to floating-point accumulation
//! order.

use serde::{Deserialize, Serialize};
use wide::f32x8;

/// Distance-computation backend, selected transparently at construction.
///
/// The choice has no observable effect beyond floating-point accumulation
/// order: result ordering and ids are identical across backends for
/// well-separated inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceBackend {
    /// Scalar loop, the reference implementation.
    Scalar,
    /// `wide` f32x8 kernel with a scalar tail.
    #[default]
    Simd,
}

impl DistanceBackend {
    /// Pick a backend for this build.
    ///
    /// `wide` lowers to portable SIMD on every target, so the vectorized
    /// kernel is always eligible.
    pub fn auto() -> Self {
        DistanceBackend::Simd
    }

    /// Squared L2 distance between two equal-length vectors.
    pub fn squared_l2(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            DistanceBackend::Scalar => squared_l2(a, b),
            DistanceBackend::Simd => squared_l2_simd(a, b),
        }
    }

    /// Get the name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceBackend::Scalar => "scalar",
            DistanceBackend::Simd => "simd",
        }
    }
}

/// Squared L2 distance between two equal-length vectors (scalar).
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Squared L2 distance using f32x8 lanes, 8 components at a time.
fn squared_l2_simd(a: &[f32], b: &[f32]) -> f32 {
    let chunks_a = a.chunks_exact(8);
    let chunks_b = b.chunks_exact(8);
    let tail_a = chunks_a.remainder();
    let tail_b = chunks_b.remainder();

    let mut acc = f32x8::splat(0.0);
    for (ca, cb) in chunks_a.zip(chunks_b) {
        let va = f32x8::new([ca[0], ca[1], ca[2], ca[3], ca[4], ca[5], ca[6], ca[7]]);
        let vb = f32x8::new([cb[0], cb[1], cb[2], cb[3], cb[4], cb[5], cb[6], cb[7]]);
        let diff = va - vb;
        acc += diff * diff;
    }

    acc.reduce_add() + squared_l2(tail_a, tail_b)
}
