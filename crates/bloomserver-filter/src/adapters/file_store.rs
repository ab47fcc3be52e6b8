//! On-disk filter format
//!
//! ```text
//! offset 0   : FILTER_MAGIC (21 bytes)
//! offset 21  : k, u64 little-endian
//! offset 29  : m, u64 little-endian
//! offset 37  : ceil(m / 8) bytes, packed bit array (LSB first)
//! ```
//!
//! There is no version field. A format change needs a new magic value.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{BloomFilter, FilterParameters};
use crate::error::StoreError;

/// Magic token identifying a filter file
pub const FILTER_MAGIC: &[u8; 21] = b"\x01BLOOMSERVER/FILTER\x03\x02";

/// Bytes preceding the bit array
pub const HEADER_LEN: usize = FILTER_MAGIC.len() + 8 + 8;

/// Binary persistence for `BloomFilter`
pub struct FilterStore;

impl FilterStore {
    /// Write `filter` to `writer` in the filter file format
    pub fn save<W: Write>(filter: &BloomFilter, mut writer: W) -> Result<(), StoreError> {
        let params = filter.parameters();

        writer
            .write_all(FILTER_MAGIC)
            .map_err(StoreError::io("writing magic bytes"))?;
        writer
            .write_all(&params.k.to_le_bytes())
            .map_err(StoreError::io("writing K"))?;
        writer
            .write_all(&params.m.to_le_bytes())
            .map_err(StoreError::io("writing M"))?;
        writer
            .write_all(filter.as_bytes())
            .map_err(StoreError::io("writing bit array"))?;
        writer.flush().map_err(StoreError::io("flushing filter"))
    }

    /// Read a filter from `reader`, validating every field
    pub fn load<R: Read>(mut reader: R) -> Result<BloomFilter, StoreError> {
        let mut magic = [0u8; FILTER_MAGIC.len()];
        read_field(&mut reader, &mut magic, "magic bytes")?;
        if &magic != FILTER_MAGIC {
            return Err(StoreError::Format(
                "no magic bytes match, is this a filter file?".to_string(),
            ));
        }

        let k = read_u64(&mut reader, "K")?;
        let m = read_u64(&mut reader, "M")?;
        let params = FilterParameters::new(m, k)
            .map_err(|e| StoreError::Format(format!("bad header: {}", e)))?;

        // Grow the buffer as data arrives so a forged M cannot force a huge
        // allocation up front.
        let expected = params.byte_len();
        let mut raw = Vec::new();
        reader
            .by_ref()
            .take(expected)
            .read_to_end(&mut raw)
            .map_err(StoreError::io("reading bit array"))?;
        if (raw.len() as u64) < expected {
            return Err(StoreError::Format(format!(
                "truncated bit array: got {} of {} bytes",
                raw.len(),
                expected
            )));
        }

        BloomFilter::from_raw_parts(params, raw).map_err(|e| StoreError::Format(e.to_string()))
    }

    /// Truncate `path` and write `filter` to it
    pub fn save_to_path(filter: &BloomFilter, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(StoreError::file(path))?;
        let mut writer = BufWriter::new(file);
        Self::save(filter, &mut writer)?;
        writer
            .into_inner()
            .map_err(|e| StoreError::file(path)(e.into_error()))?
            .sync_all()
            .map_err(StoreError::file(path))?;

        debug!(
            path = %path.display(),
            m = filter.size_bits(),
            k = filter.hash_count(),
            "filter saved"
        );
        Ok(())
    }

    /// Load the filter stored at `path`
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<BloomFilter, StoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(StoreError::file(path))?;
        let filter = Self::load(BufReader::new(file))?;

        info!(
            path = %path.display(),
            m = filter.size_bits(),
            k = filter.hash_count(),
            "filter loaded"
        );
        Ok(filter)
    }
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<(), StoreError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => StoreError::Format(format!("truncated {}", what)),
        _ => StoreError::Io {
            action: "reading filter header",
            source: e,
        },
    })
}

fn read_u64<R: Read>(reader: &mut R, what: &str) -> Result<u64, StoreError> {
    let mut bytes = [0u8; 8];
    read_field(reader, &mut bytes, what)?;
    Ok(u64::from_le_bytes(bytes))
}
