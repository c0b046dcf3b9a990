use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, Document, FieldValue};
use crate::schema::schema::Schema;

pub const MAGIC: [u8; 4] = *b"FNDX";
pub const FORMAT_VERSION: u32 = 1;

/// Byte count of magic + version + payload length + checksum.
const HEADER_LEN: usize = 4 + 4 + 8 + 4;

/// Deterministic flat image of one collection's live state. Every sequence
/// is sorted by its natural key before serialization, so identical engines
/// produce identical bytes. The vocabulary trie is not persisted; it is
/// rebuilt from the posting tokens on load.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotImage {
    pub schema: Schema,
    pub doc_count: u64,
    pub total_doc_length: u64,
    pub documents: Vec<(DocId, Document)>,
    pub lengths: Vec<(DocId, u32)>,
    pub postings: Vec<(String, Vec<(DocId, Vec<u32>)>)>,
    pub facets: Vec<(String, Vec<(FieldValue, Vec<DocId>)>)>,
    pub numerics: Vec<(String, Vec<(f64, DocId)>)>,
}

/// Write the image as one self-contained blob:
/// magic, format version, payload length, CRC32, bincode payload.
/// The bytes land in a sibling temp file first so a failed write never
/// clobbers the previous snapshot.
pub fn write(path: &Path, image: &SnapshotImage) -> Result<()> {
    let payload = bincode::serialize(image)?;
    let checksum = crc32fast::hash(&payload);

    let mut data = Vec::with_capacity(HEADER_LEN + payload.len());
    data.extend_from_slice(&MAGIC);
    data.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    data.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    data.extend_from_slice(&checksum.to_le_bytes());
    data.extend_from_slice(&payload);

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read(path: &Path) -> Result<SnapshotImage> {
    let data = fs::read(path)?;
    if data.len() < HEADER_LEN {
        return Err(corrupt(path, "truncated header"));
    }
    if data[0..4] != MAGIC {
        return Err(corrupt(path, "bad magic"));
    }

    let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
    if version != FORMAT_VERSION {
        return Err(corrupt(path, &format!("unsupported format version {}", version)));
    }

    let payload_len = u64::from_le_bytes(data[8..16].try_into().unwrap()) as usize;
    let checksum = u32::from_le_bytes(data[16..20].try_into().unwrap());
    let payload = &data[HEADER_LEN..];
    if payload.len() != payload_len {
        return Err(corrupt(path, "payload length mismatch"));
    }
    if crc32fast::hash(payload) != checksum {
        return Err(corrupt(path, "checksum mismatch"));
    }

    bincode::deserialize(payload).map_err(|e| corrupt(path, &e.to_string()))
}

fn corrupt(path: &Path, detail: &str) -> Error {
    Error::new(
        ErrorKind::Corrupt,
        format!("snapshot {}: {}", path.display(), detail),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_image() -> SnapshotImage {
        SnapshotImage {
            schema: Schema::new(),
            doc_count: 0,
            total_doc_length: 0,
            documents: Vec::new(),
            lengths: Vec::new(),
            postings: Vec::new(),
            facets: Vec::new(),
            numerics: Vec::new(),
        }
    }

    #[test]
    fn round_trips_an_empty_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.index.bin");
        write(&path, &empty_image()).unwrap();

        let image = read(&path).unwrap();
        assert_eq!(image.doc_count, 0);
        assert!(image.postings.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.index.bin");
        fs::write(&path, b"NOPE----------------").unwrap();
        assert_eq!(read(&path).unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn rejects_flipped_payload_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.index.bin");
        write(&path, &empty_image()).unwrap();

        let mut data = fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        fs::write(&path, &data).unwrap();

        assert_eq!(read(&path).unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn rejects_truncation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.index.bin");
        write(&path, &empty_image()).unwrap();

        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() - 2]).unwrap();

        assert_eq!(read(&path).unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read(&dir.path().join("absent.index.bin")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
