//! Record body codec.
//!
//! Layout at each record offset:
//!
//! ```text
//! kind         u8        RecordKind tag
//! id           [u8; 16]
//! name         string
//! field_count  u8        must equal the kind's slot count
//! fields       string × field_count
//!
//! string       i32 LE byte length (-1 = absent), then UTF-8 bytes
//! ```

use std::io::{self, Write};

use crate::error::DecodeError;
use crate::pack::PackEntry;
use crate::record::{Identifier, Record, RecordBody, RecordKind};

/// Length prefix marking an absent string
const ABSENT_STRING: i32 = -1;

/// Bounds-checked little-endian reader over an in-memory pack
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Cursor positioned at `offset`
    pub fn at(data: &'a [u8], offset: u32) -> Result<Self, DecodeError> {
        let position = offset as usize;
        if position >= data.len() {
            return Err(DecodeError::OffsetOutOfRange {
                offset,
                len: data.len(),
            });
        }
        Ok(Self { data, position })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.data.len() - self.position;
        if len > remaining {
            return Err(DecodeError::UnexpectedEof {
                position: self.position,
                needed: len - remaining,
            });
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_identifier(&mut self) -> Result<Identifier, DecodeError> {
        let mut bytes = [0u8; Identifier::LEN];
        bytes.copy_from_slice(self.take(Identifier::LEN)?);
        Ok(Identifier::from_bytes(bytes))
    }

    pub fn read_string(&mut self) -> Result<Option<String>, DecodeError> {
        let len = self.read_i32()?;
        if len == ABSENT_STRING {
            return Ok(None);
        }
        let len = usize::try_from(len).map_err(|_| DecodeError::NegativeLength(len))?;

        let position = self.position;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { position })?;
        Ok(Some(s.to_string()))
    }
}

/// Decode the record stored at `offset` in `data` (the whole pack).
pub fn decode_record(data: &[u8], offset: u32) -> Result<Record, DecodeError> {
    let mut cursor = ByteCursor::at(data, offset)?;

    let tag = cursor.read_u8()?;
    let kind = RecordKind::from_u8(tag).ok_or(DecodeError::UnknownKind(tag))?;
    let id = cursor.read_identifier()?;
    let name = cursor.read_string()?.unwrap_or_default();

    let field_count = cursor.read_u8()?;
    if field_count != kind.field_slots() {
        return Err(DecodeError::FieldCount {
            kind: kind.name(),
            expected: kind.field_slots(),
            found: field_count,
        });
    }

    let fields = (0..field_count)
        .map(|_| cursor.read_string())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record {
        id,
        name,
        body: RecordBody::from_fields(kind, fields),
    })
}

/// Decode the record a header entry points at, checking it carries the
/// entry's identifier.
pub fn decode_entry(data: &[u8], entry: &PackEntry) -> Result<Record, DecodeError> {
    let record = decode_record(data, entry.offset)?;
    if record.id != entry.id {
        return Err(DecodeError::IdentifierMismatch {
            expected: entry.id,
            found: record.id,
        });
    }
    Ok(record)
}

/// Encode a record in the layout `decode_record` reads
pub fn encode_record<W: Write>(record: &Record, out: &mut W) -> io::Result<()> {
    let kind = record.kind();
    out.write_all(&[kind.tag()])?;
    out.write_all(record.id.as_bytes())?;
    write_string(out, Some(&record.name))?;

    let fields = record.body.fields();
    out.write_all(&[fields.len() as u8])?;
    for field in fields {
        write_string(out, field)?;
    }
    Ok(())
}

fn write_string<W: Write>(out: &mut W, value: Option<&str>) -> io::Result<()> {
    let Some(value) = value else {
        return out.write_all(&ABSENT_STRING.to_le_bytes());
    };

    let len = i32::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too long for pack"))?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Localized;

    fn encoded(record: &Record) -> Vec<u8> {
        let mut bytes = Vec::new();
        encode_record(record, &mut bytes).unwrap();
        bytes
    }

    fn cleric() -> Record {
        Record::new(
            Identifier::from_u128(0xC1),
            "ClericClass",
            RecordBody::CharacterClass(Localized::new(
                Some("Cleric"),
                Some("Clerics channel divine energy"),
            )),
        )
    }

    #[test]
    fn test_decode_at_offset() {
        let mut data = vec![0xEEu8; 8];
        data.extend(encoded(&cleric()));

        let record = decode_record(&data, 8).unwrap();
        assert_eq!(record, cleric());
    }

    #[test]
    fn test_absent_fields() {
        let asks = Record::new(
            Identifier::from_u128(2),
            "CompanionAsks",
            RecordBody::AsksList { display_name: None },
        );
        assert_eq!(decode_record(&encoded(&asks), 0).unwrap(), asks);
    }

    #[test]
    fn test_offset_out_of_range() {
        let data = encoded(&cleric());
        let err = decode_record(&data, data.len() as u32).unwrap_err();
        assert!(matches!(err, DecodeError::OffsetOutOfRange { .. }));
    }

    #[test]
    fn test_truncated_record() {
        let data = encoded(&cleric());
        let err = decode_record(&data[..data.len() - 3], 0).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof { needed: 3, .. }));
    }

    #[test]
    fn test_unknown_kind() {
        let mut data = encoded(&cleric());
        data[0] = 0x42;
        assert!(matches!(
            decode_record(&data, 0).unwrap_err(),
            DecodeError::UnknownKind(0x42)
        ));
    }

    #[test]
    fn test_field_count_mismatch() {
        let other = Record::new(Identifier::from_u128(3), "Misc", RecordBody::Other);
        let mut data = encoded(&other);
        // Claim to be a unit fact, which needs two fields
        data[0] = RecordKind::UnitFact.tag();
        let err = decode_record(&data, 0).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FieldCount {
                expected: 2,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_utf8_and_negative_length() {
        let mut data = vec![RecordKind::Other.tag()];
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&[0xFF, 0xFE]);
        data.push(0);
        assert!(matches!(
            decode_record(&data, 0).unwrap_err(),
            DecodeError::InvalidUtf8 { position: 21 }
        ));

        let mut data = vec![RecordKind::Other.tag()];
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&(-7i32).to_le_bytes());
        assert!(matches!(
            decode_record(&data, 0).unwrap_err(),
            DecodeError::NegativeLength(-7)
        ));
    }

    #[test]
    fn test_decode_entry_checks_identifier() {
        let data = encoded(&cleric());
        let entry = PackEntry {
            id: Identifier::from_u128(0xC1),
            offset: 0,
        };
        assert!(decode_entry(&data, &entry).is_ok());

        let wrong = PackEntry {
            id: Identifier::from_u128(0xC2),
            offset: 0,
        };
        assert!(matches!(
            decode_entry(&data, &wrong).unwrap_err(),
            DecodeError::IdentifierMismatch { .. }
        ));
    }
}
