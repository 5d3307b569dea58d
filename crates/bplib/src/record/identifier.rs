use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 128-bit blueprint identifier.
///
/// The canonical string form is 32 lowercase hex digits without hyphens,
/// which is the form id searches match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Identifier(Uuid);

impl Identifier {
    /// Size of an identifier on disk
    pub const LEN: usize = 16;

    /// Build from the raw on-disk bytes, kept in file order.
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        self.0.as_bytes()
    }

    /// Canonical string form (e.g. `"0123456789abcdef0123456789abcdef"`)
    ///
    /// Hex digits follow the on-disk byte order. A .NET `Guid("N")` string
    /// of the same bytes differs in its first three groups, which .NET
    /// renders little-endian.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

impl FromStr for Identifier {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for Identifier {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form_is_simple_lowercase() {
        let id = Identifier::from_u128(0x0123_4567_89AB_CDEF_0123_4567_89AB_CDEF);
        assert_eq!(id.canonical(), "0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn test_bytes_keep_file_order() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0xAB;
        bytes[15] = 0x01;
        let id = Identifier::from_bytes(bytes);
        assert_eq!(id.as_bytes(), &bytes);
        assert!(id.canonical().starts_with("ab"));
        assert!(id.canonical().ends_with("01"));
    }

    #[test]
    fn test_canonical_is_not_dotnet_byte_order() {
        let bytes: [u8; 16] = std::array::from_fn(|i| i as u8 + 1);
        let id = Identifier::from_bytes(bytes);
        assert_eq!(id.canonical(), "0102030405060708090a0b0c0d0e0f10");
        // Guid("N") of the same bytes would read 04030201060508070...
        assert!(!id.canonical().starts_with("04030201"));
    }

    #[test]
    fn test_parse_accepts_hyphenated() {
        let id: Identifier = "01234567-89ab-cdef-0123-456789abcdef".parse().unwrap();
        assert_eq!(id.canonical(), "0123456789abcdef0123456789abcdef");
        assert!("not-a-guid".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = Identifier::from_u128(1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000000000000000000000000001\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
