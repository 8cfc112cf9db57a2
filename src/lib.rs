//! # specsearch
//!
//! A k-nearest-neighbor similarity search library for embedded spectra.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Exact (flat) and approximate (partitioned/IVF) indexes over L2 distance
//! - Reproducible k-means training with an explicit seed
//! - SIMD-accelerated distance kernels with a scalar fallback
//! - Single-file index persistence with exact round-trips

pub mod cli;
pub mod error;
pub mod index;
pub mod io;
pub mod search;
pub mod vector;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
