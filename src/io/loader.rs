//! Loading vector corpora from disk.
//!
//! Three container formats are supported, selected by file extension:
//! - `.h5`: named-dataset container holding a `MATRIX` dataset
//! - `.npy`: NumPy binary array (v1/v2 headers, `<f4` or `<f8`, C order)
//! - `.txt`: whitespace-delimited numeric table, one vector per line
//!
//! Any other extension is `UnsupportedFormat`; a missing path is
//! `FileNotFound`. A one-dimensional array is treated as a single vector.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, SpecSearchError};
use crate::io::container::{Dataset, read_dataset};
use crate::vector::VectorCorpus;

/// Dataset name the hierarchical container stores its matrix under.
pub const MATRIX_DATASET_NAME: &str = "MATRIX";

/// Load an N×D corpus of f32 vectors from a file, by extension.
pub fn load_vectors<P: AsRef<Path>>(path: P) -> Result<VectorCorpus> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SpecSearchError::file_not_found(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "h5" => load_h5(path),
        "npy" => load_npy(path),
        "txt" => load_txt(path),
        other => Err(SpecSearchError::unsupported_format(format!(
            "unknown extension .{} for file {}",
            other,
            path.display()
        ))),
    }
}

fn load_h5(path: &Path) -> Result<VectorCorpus> {
    match read_dataset(path, MATRIX_DATASET_NAME)? {
        Dataset::F32 { shape, data } => corpus_from_shape(&shape, data, path),
        Dataset::I64 { .. } => Err(SpecSearchError::corrupt(format!(
            "{}: dataset {} is not a float matrix",
            path.display(),
            MATRIX_DATASET_NAME
        ))),
    }
}

fn load_txt(path: &Path) -> Result<VectorCorpus> {
    let reader = BufReader::new(File::open(path)?);

    let mut corpus: Option<VectorCorpus> = None;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row: Vec<f32> = trimmed
            .split_whitespace()
            .map(|token| {
                token.parse::<f32>().map_err(|_| {
                    SpecSearchError::corrupt(format!(
                        "{}:{}: invalid number {:?}",
                        path.display(),
                        line_no + 1,
                        token
                    ))
                })
            })
            .collect::<Result<_>>()?;

        let corpus = corpus.get_or_insert_with(|| VectorCorpus::new(row.len()));
        corpus.push(&row)?;
    }

    corpus.ok_or_else(|| {
        SpecSearchError::corrupt(format!("{}: no vectors in text file", path.display()))
    })
}

/// Parse a NumPy `.npy` file into a corpus.
///
/// Handles format versions 1.x and 2.x, little-endian `f4`/`f8` scalars,
/// and C-order layout only.
fn load_npy(path: &Path) -> Result<VectorCorpus> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != b"\x93NUMPY" {
        return Err(SpecSearchError::corrupt(format!(
            "{}: not an npy file (bad magic)",
            path.display()
        )));
    }

    let major = reader.read_u8()?;
    let _minor = reader.read_u8()?;
    let header_len = match major {
        1 => reader.read_u16::<LittleEndian>()? as usize,
        2 | 3 => reader.read_u32::<LittleEndian>()? as usize,
        other => {
            return Err(SpecSearchError::corrupt(format!(
                "{}: unsupported npy version {}",
                path.display(),
                other
            )));
        }
    };

    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let header = String::from_utf8(header_bytes)
        .map_err(|_| SpecSearchError::corrupt(format!("{}: bad npy header", path.display())))?;

    let descr = header_scalar(&header, "descr").ok_or_else(|| {
        SpecSearchError::corrupt(format!("{}: npy header missing descr", path.display()))
    })?;
    let fortran = header_scalar(&header, "fortran_order").ok_or_else(|| {
        SpecSearchError::corrupt(format!(
            "{}: npy header missing fortran_order",
            path.display()
        ))
    })?;
    if fortran == "True" {
        return Err(SpecSearchError::unsupported_format(format!(
            "{}: Fortran-order npy arrays are not supported",
            path.display()
        )));
    }
    let shape = parse_shape(&header).ok_or_else(|| {
        SpecSearchError::corrupt(format!("{}: npy header missing shape", path.display()))
    })?;

    let total: usize = shape.iter().product();
    let data = match descr.trim_matches(|c| c == '\'' || c == '"') {
        "<f4" | "|f4" => {
            let mut data = vec![0f32; total];
            reader.read_f32_into::<LittleEndian>(&mut data)?;
            data
        }
        "<f8" | "|f8" => {
            let mut doubles = vec![0f64; total];
            reader.read_f64_into::<LittleEndian>(&mut doubles)?;
            doubles.into_iter().map(|v| v as f32).collect()
        }
        other => {
            return Err(SpecSearchError::unsupported_format(format!(
                "{}: npy dtype {} (expected <f4 or <f8)",
                path.display(),
                other
            )));
        }
    };

    corpus_from_shape(&shape, data, path)
}

/// Everything after one key of an npy header dict, untrimmed at the end.
fn header_field(header: &str, key: &str) -> Option<String> {
    let pattern = format!("'{}':", key);
    let start = header.find(&pattern)? + pattern.len();
    let rest = header[start..].trim_start();
    Some(rest.to_string())
}

/// A single comma-free value for one header key (descr, fortran_order).
fn header_scalar(header: &str, key: &str) -> Option<String> {
    let raw = header_field(header, key)?;
    let end = raw.find([',', '}'])?;
    Some(raw[..end].trim().to_string())
}

fn parse_shape(header: &str) -> Option<Vec<usize>> {
    let raw = header_field(header, "shape")?;
    let open = raw.find('(')?;
    let close = raw.find(')')?;
    let inner = &raw[open + 1..close];

    let mut shape = Vec::new();
    for token in inner.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        shape.push(token.parse::<usize>().ok()?);
    }
    Some(shape)
}

fn corpus_from_shape(shape: &[usize], data: Vec<f32>, path: &Path) -> Result<VectorCorpus> {
    match shape {
        // A single vector: treat as one row.
        [d] => VectorCorpus::from_flat(data, (*d).max(1)),
        [_, d] => VectorCorpus::from_flat(data, *d),
        _ => Err(SpecSearchError::corrupt(format!(
            "{}: expected a 1-D or 2-D array, got shape {:?}",
            path.display(),
            shape
        ))),
    }
}
