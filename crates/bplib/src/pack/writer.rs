use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use super::codec::encode_record;
use super::header::header_len;
use crate::error::Result;
use crate::record::{Identifier, Record};

enum Payload {
    Record(Record),
    Raw(Vec<u8>),
}

/// Builds a pack file: header followed by the encoded records, in push order.
#[derive(Default)]
pub struct PackWriter {
    entries: Vec<(Identifier, Payload)>,
}

impl PackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) -> &mut Self {
        self.entries.push((record.id, Payload::Record(record)));
        self
    }

    /// Add an entry whose body is written verbatim instead of encoded
    pub fn push_raw(&mut self, id: Identifier, bytes: Vec<u8>) -> &mut Self {
        self.entries.push((id, Payload::Raw(bytes)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let count = i32::try_from(self.entries.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many records"))?;

        let mut data = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());
        let data_start = header_len(self.entries.len());

        for (_, payload) in &self.entries {
            let offset = u32::try_from(data_start + data.len()).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "pack exceeds 4 GiB")
            })?;
            offsets.push(offset);

            match payload {
                Payload::Record(record) => encode_record(record, &mut data)?,
                Payload::Raw(bytes) => data.extend_from_slice(bytes),
            }
        }

        let mut out = Vec::with_capacity(data_start + data.len());
        out.extend_from_slice(&count.to_le_bytes());
        for ((id, _), offset) in self.entries.iter().zip(&offsets) {
            out.extend_from_slice(id.as_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend(data);
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, self.to_bytes()?)?;
        info!(
            "Wrote {} records to {}",
            self.entries.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}
