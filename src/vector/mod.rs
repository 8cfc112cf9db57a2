//! Vector corpus and distance primitives.
//!
//! This module holds the data the indexes are built over and the pure
//! computation they share:
//! - `corpus`: contiguous row-major storage of fixed-dimension f32 vectors
//! - `distance`: squared-L2 kernels behind a pluggable backend
//! - `topk`: exact partial top-k selection with deterministic tie-breaks

pub mod corpus;
pub mod distance;
pub mod topk;

pub use corpus::VectorCorpus;
pub use distance::{DistanceBackend, squared_l2};
pub use topk::{Neighbor, select_top_k};
