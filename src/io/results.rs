//! Result persistence: a ResultSet as three named datasets.
//!
//! The output container holds `spectrum_ids` (the query ids 0..Q-1), the
//! Q×k distance matrix `D`, and the Q×k corpus-id matrix `I`, all written
//! through the chunked dataset container.

use std::path::Path;

use crate::error::{Result, SpecSearchError};
use crate::io::container::{Dataset, read_container, write_container};
use crate::search::ResultSet;

/// Query-id dataset name.
pub const QUERY_IDS_DATASET: &str = "spectrum_ids";
/// Distance-matrix dataset name.
pub const DISTANCES_DATASET: &str = "D";
/// Corpus-id-matrix dataset name.
pub const IDS_DATASET: &str = "I";

/// Write a result set to a container file.
pub fn write_results<P: AsRef<Path>>(results: &ResultSet, path: P) -> Result<()> {
    let queries = results.num_queries();
    let k = results.k();

    let datasets = vec![
        (
            QUERY_IDS_DATASET.to_string(),
            Dataset::I64 {
                shape: vec![queries],
                data: (0..queries as i64).collect(),
            },
        ),
        (
            DISTANCES_DATASET.to_string(),
            Dataset::F32 {
                shape: vec![queries, k],
                data: results.distances().to_vec(),
            },
        ),
        (
            IDS_DATASET.to_string(),
            Dataset::I64 {
                shape: vec![queries, k],
                data: results.ids().to_vec(),
            },
        ),
    ];
    write_container(path, &datasets)
}

/// Read back a result file written by [`write_results`].
pub fn read_results<P: AsRef<Path>>(path: P) -> Result<ResultSet> {
    let path = path.as_ref();
    let mut datasets = read_container(path)?;

    let distances = match datasets.remove(DISTANCES_DATASET) {
        Some(Dataset::F32 { shape, data }) if shape.len() == 2 => (shape, data),
        _ => {
            return Err(SpecSearchError::corrupt(format!(
                "{}: missing or malformed {} dataset",
                path.display(),
                DISTANCES_DATASET
            )));
        }
    };
    let ids = match datasets.remove(IDS_DATASET) {
        Some(Dataset::I64 { shape, data }) if shape == distances.0 => data,
        _ => {
            return Err(SpecSearchError::corrupt(format!(
                "{}: missing or mismatched {} dataset",
                path.display(),
                IDS_DATASET
            )));
        }
    };

    Ok(ResultSet::from_parts(distances.0[1], distances.1, ids))
}
