use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{FormatError, Result};
use crate::record::Identifier;

/// Size of the record count at the start of the pack
pub const COUNT_LEN: usize = 4;
/// Size of one header entry: identifier + offset
pub const ENTRY_LEN: usize = Identifier::LEN + 4;

/// Upper bound on up-front allocation for a declared record count
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

/// One header entry: where a record lives in the pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackEntry {
    pub id: Identifier,
    /// Absolute byte offset of the record within the pack file
    pub offset: u32,
}

/// Byte length of a header holding `count` entries (where the data region starts)
pub fn header_len(count: usize) -> usize {
    COUNT_LEN + count * ENTRY_LEN
}

/// Read the pack header: a little-endian `i32` count followed by that many
/// `(16-byte id, u32 offset)` entries.
///
/// Record bodies are not touched.
pub fn read_pack_index<R: Read>(reader: &mut R) -> Result<Vec<PackEntry>> {
    let mut count_buf = [0u8; COUNT_LEN];
    read_or_truncated(reader, &mut count_buf, FormatError::MissingCount)?;

    let declared = i32::from_le_bytes(count_buf);
    let count = usize::try_from(declared).map_err(|_| FormatError::NegativeCount(declared))?;

    let mut entries = Vec::with_capacity(count.min(MAX_PREALLOCATED_ENTRIES));
    let mut entry_buf = [0u8; ENTRY_LEN];
    for read in 0..count {
        read_or_truncated(
            reader,
            &mut entry_buf,
            FormatError::Truncated {
                expected: count,
                read,
            },
        )?;

        let mut id = [0u8; Identifier::LEN];
        id.copy_from_slice(&entry_buf[..Identifier::LEN]);
        let offset = u32::from_le_bytes([
            entry_buf[16],
            entry_buf[17],
            entry_buf[18],
            entry_buf[19],
        ]);

        entries.push(PackEntry {
            id: Identifier::from_bytes(id),
            offset,
        });
    }

    debug!("Read pack header with {} entries", entries.len());
    Ok(entries)
}

/// Open a pack file and read its header
pub fn read_pack_index_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PackEntry>> {
    let mut reader = BufReader::new(File::open(path)?);
    read_pack_index(&mut reader)
}

fn read_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8], on_eof: FormatError) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(on_eof.into()),
        Err(e) => Err(e.into()),
    }
}
