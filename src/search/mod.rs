//! Query-time components: the uniform searcher and its result sets.

pub mod results;
pub mod searcher;

pub use results::{NO_NEIGHBOR, ResultSet};
pub use searcher::{IndexSearcher, SearcherConfig};
