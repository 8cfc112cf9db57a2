//! Binary container of named array datasets.
//!
//! A container file holds any number of named datasets, each an
//! n-dimensional array of f32 or i64 values. Data is written in fixed-size
//! chunks, each followed by a crc32 checksum, so large matrices stream
//! through a bounded buffer and corruption is detected per chunk rather
//! than per file. This is the `.h5` surface of this toolchain (it is not
//! the libhdf5 wire format, which no pure-Rust dependency of this crate
//! speaks; readers and writers are this crate's own).
//!
//! Layout:
//!
//! ```text
//! magic "SPH5" | u32 version | u32 dataset count
//! per dataset: name (u16 len + utf8) | u8 dtype | u8 ndim | u64 shape...
//!              chunked values (u32 count + values + u32 crc32)*
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SpecSearchError};

const MAGIC: &[u8; 4] = b"SPH5";
const FORMAT_VERSION: u32 = 1;

/// Values per chunk.
const CHUNK_ELEMS: usize = 8192;

const DTYPE_F32: u8 = 0;
const DTYPE_I64: u8 = 1;

/// One named array dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// 32-bit float array.
    F32 {
        /// Array shape, row-major.
        shape: Vec<usize>,
        /// Flattened values.
        data: Vec<f32>,
    },
    /// 64-bit signed integer array.
    I64 {
        /// Array shape, row-major.
        shape: Vec<usize>,
        /// Flattened values.
        data: Vec<i64>,
    },
}

impl Dataset {
    fn shape(&self) -> &[usize] {
        match self {
            Dataset::F32 { shape, .. } => shape,
            Dataset::I64 { shape, .. } => shape,
        }
    }

    fn len(&self) -> usize {
        match self {
            Dataset::F32 { data, .. } => data.len(),
            Dataset::I64 { data, .. } => data.len(),
        }
    }

    fn dtype(&self) -> u8 {
        match self {
            Dataset::F32 { .. } => DTYPE_F32,
            Dataset::I64 { .. } => DTYPE_I64,
        }
    }
}

/// Write named datasets to a container file, replacing any existing file.
pub fn write_container<P: AsRef<Path>>(path: P, datasets: &[(String, Dataset)]) -> Result<()> {
    for (name, dataset) in datasets {
        let expected: usize = dataset.shape().iter().product();
        if expected != dataset.len() {
            return Err(SpecSearchError::invalid_operation(format!(
                "dataset {} shape {:?} does not match {} values",
                name,
                dataset.shape(),
                dataset.len()
            )));
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u32::<LittleEndian>(datasets.len() as u32)?;

    for (name, dataset) in datasets {
        write_dataset_entry(&mut writer, name, dataset)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_dataset_entry<W: Write>(writer: &mut W, name: &str, dataset: &Dataset) -> Result<()> {
    let name_bytes = name.as_bytes();
    writer.write_u16::<LittleEndian>(name_bytes.len() as u16)?;
    writer.write_all(name_bytes)?;
    writer.write_u8(dataset.dtype())?;

    let shape = dataset.shape();
    writer.write_u8(shape.len() as u8)?;
    for &dim in shape {
        writer.write_u64::<LittleEndian>(dim as u64)?;
    }

    match dataset {
        Dataset::F32 { data, .. } => {
            for chunk in data.chunks(CHUNK_ELEMS) {
                let mut hasher = crc32fast::Hasher::new();
                writer.write_u32::<LittleEndian>(chunk.len() as u32)?;
                for &value in chunk {
                    writer.write_f32::<LittleEndian>(value)?;
                    hasher.update(&value.to_le_bytes());
                }
                writer.write_u32::<LittleEndian>(hasher.finalize())?;
            }
        }
        Dataset::I64 { data, .. } => {
            for chunk in data.chunks(CHUNK_ELEMS) {
                let mut hasher = crc32fast::Hasher::new();
                writer.write_u32::<LittleEndian>(chunk.len() as u32)?;
                for &value in chunk {
                    writer.write_i64::<LittleEndian>(value)?;
                    hasher.update(&value.to_le_bytes());
                }
                writer.write_u32::<LittleEndian>(hasher.finalize())?;
            }
        }
    }
    Ok(())
}

/// Read every dataset of a container file.
pub fn read_container<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Dataset>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SpecSearchError::file_not_found(path.display().to_string()));
    }

    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(SpecSearchError::corrupt(format!(
            "{}: not a dataset container (bad magic)",
            path.display()
        )));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(SpecSearchError::corrupt(format!(
            "{}: unsupported container version {}",
            path.display(),
            version
        )));
    }

    let count = reader.read_u32::<LittleEndian>()? as usize;
    let mut datasets = HashMap::with_capacity(count);
    for _ in 0..count {
        let (name, dataset) = read_dataset_entry(&mut reader)?;
        datasets.insert(name, dataset);
    }
    Ok(datasets)
}

/// Read one named dataset from a container file.
pub fn read_dataset<P: AsRef<Path>>(path: P, name: &str) -> Result<Dataset> {
    let path = path.as_ref();
    let mut datasets = read_container(path)?;
    datasets.remove(name).ok_or_else(|| {
        SpecSearchError::corrupt(format!(
            "{}: no dataset named {}",
            path.display(),
            name
        ))
    })
}

fn read_dataset_entry<R: Read>(reader: &mut R) -> Result<(String, Dataset)> {
    let name_len = reader.read_u16::<LittleEndian>()? as usize;
    let mut name_bytes = vec![0u8; name_len];
    reader.read_exact(&mut name_bytes)?;
    let name = String::from_utf8(name_bytes)
        .map_err(|_| SpecSearchError::corrupt("dataset name is not valid UTF-8"))?;

    let dtype = reader.read_u8()?;
    let ndim = reader.read_u8()? as usize;
    let mut shape = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        shape.push(reader.read_u64::<LittleEndian>()? as usize);
    }
    let total: usize = shape.iter().product();

    let dataset = match dtype {
        DTYPE_F32 => {
            let mut data = Vec::with_capacity(total);
            while data.len() < total {
                read_chunk_f32(reader, &mut data, total, &name)?;
            }
            Dataset::F32 { shape, data }
        }
        DTYPE_I64 => {
            let mut data = Vec::with_capacity(total);
            while data.len() < total {
                read_chunk_i64(reader, &mut data, total, &name)?;
            }
            Dataset::I64 { shape, data }
        }
        other => {
            return Err(SpecSearchError::corrupt(format!(
                "dataset {}: unknown dtype tag {}",
                name, other
            )));
        }
    };
    Ok((name, dataset))
}

fn read_chunk_f32<R: Read>(
    reader: &mut R,
    data: &mut Vec<f32>,
    total: usize,
    name: &str,
) -> Result<()> {
    let count = reader.read_u32::<LittleEndian>()? as usize;
    if data.len() + count > total {
        return Err(SpecSearchError::corrupt(format!(
            "dataset {}: chunk overruns declared shape",
            name
        )));
    }
    let mut hasher = crc32fast::Hasher::new();
    for _ in 0..count {
        let value = reader.read_f32::<LittleEndian>()?;
        hasher.update(&value.to_le_bytes());
        data.push(value);
    }
    verify_checksum(reader, hasher, name)
}

fn read_chunk_i64<R: Read>(
    reader: &mut R,
    data: &mut Vec<i64>,
    total: usize,
    name: &str,
) -> Result<()> {
    let count = reader.read_u32::<LittleEndian>()? as usize;
    if data.len() + count > total {
        return Err(SpecSearchError::corrupt(format!(
            "dataset {}: chunk overruns declared shape",
            name
        )));
    }
    let mut hasher = crc32fast::Hasher::new();
    for _ in 0..count {
        let value = reader.read_i64::<LittleEndian>()?;
        hasher.update(&value.to_le_bytes());
        data.push(value);
    }
    verify_checksum(reader, hasher, name)
}

fn verify_checksum<R: Read>(reader: &mut R, hasher: crc32fast::Hasher, name: &str) -> Result<()> {
    let stored = reader.read_u32::<LittleEndian>()?;
    if stored != hasher.finalize() {
        return Err(SpecSearchError::corrupt(format!(
            "dataset {}: chunk checksum mismatch",
            name
        )));
    }
    Ok(())
}
