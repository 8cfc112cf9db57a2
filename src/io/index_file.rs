//! Single-file index persistence.
//!
//! An index file is a small fixed header (magic, format version, kind tag,
//! dimension) followed by the bincode payload of the whole [`AnyIndex`] and
//! a crc32 of that payload. bincode preserves every f32 bit pattern, so a
//! deserialized index produces bit-identical search results to the one that
//! was serialized.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SpecSearchError};
use crate::index::{AnyIndex, IndexKind, VectorIndex};

const MAGIC: &[u8; 4] = b"SSIX";
const FORMAT_VERSION: u32 = 1;

const KIND_FLAT: u8 = 0;
const KIND_PARTITIONED: u8 = 1;

fn kind_tag(kind: IndexKind) -> u8 {
    match kind {
        IndexKind::Flat => KIND_FLAT,
        IndexKind::Partitioned => KIND_PARTITIONED,
    }
}

/// Serialize a built index to a single file, replacing any existing file.
pub fn write_index<P: AsRef<Path>>(index: &AnyIndex, path: P) -> Result<()> {
    let payload = bincode::serialize(index)
        .map_err(|e| SpecSearchError::serialization(format!("index encode: {e}")))?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u8(kind_tag(index.kind()))?;
    writer.write_u64::<LittleEndian>(index.dimension() as u64)?;
    writer.write_u64::<LittleEndian>(payload.len() as u64)?;
    writer.write_all(&payload)?;
    writer.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    writer.flush()?;
    Ok(())
}

/// Deserialize an index previously written by [`write_index`].
pub fn read_index<P: AsRef<Path>>(path: P) -> Result<AnyIndex> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SpecSearchError::file_not_found(path.display().to_string()));
    }

    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(SpecSearchError::corrupt(format!(
            "{}: not an index file (bad magic)",
            path.display()
        )));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(SpecSearchError::corrupt(format!(
            "{}: unsupported index format version {}",
            path.display(),
            version
        )));
    }

    let kind = reader.read_u8()?;
    let dimension = reader.read_u64::<LittleEndian>()? as usize;
    let payload_len = reader.read_u64::<LittleEndian>()? as usize;

    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload)?;
    let stored_crc = reader.read_u32::<LittleEndian>()?;
    if stored_crc != crc32fast::hash(&payload) {
        return Err(SpecSearchError::corrupt(format!(
            "{}: index payload checksum mismatch",
            path.display()
        )));
    }

    let index: AnyIndex = bincode::deserialize(&payload)
        .map_err(|e| SpecSearchError::serialization(format!("index decode: {e}")))?;

    // The header is advisory; the payload is authoritative. Disagreement
    // means the file was tampered with or truncated mid-write.
    if kind_tag(index.kind()) != kind || index.dimension() != dimension {
        return Err(SpecSearchError::corrupt(format!(
            "{}: header does not match index payload",
            path.display()
        )));
    }

    Ok(index)
}
