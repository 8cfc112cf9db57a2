//! Boundary I/O collaborators: vector loading and index/result persistence.
//!
//! These modules own the on-disk formats the core consumes and produces.
//! The core itself performs no I/O; everything here runs strictly before
//! (loading, index reading) or after (result writing) a search.

pub mod container;
pub mod index_file;
pub mod loader;
pub mod results;

pub use container::{Dataset, read_container, read_dataset, write_container};
pub use index_file::{read_index, write_index};
pub use loader::load_vectors;
pub use results::{read_results, write_results};
