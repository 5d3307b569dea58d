use thiserror::Error;

use crate::record::Identifier;

/// Fatal problems with the pack header. Raised by `start_load` before any
/// worker is spawned.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Pack header is missing its record count")]
    MissingCount,

    #[error("Pack header truncated: expected {expected} entries, read {read}")]
    Truncated { expected: usize, read: usize },

    #[error("Pack header declares a negative record count: {0}")]
    NegativeCount(i32),
}

/// Failure to decode a single record. Never fatal to the load.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Offset {offset} is outside the pack ({len} bytes)")]
    OffsetOutOfRange { offset: u32, len: usize },

    #[error("Unexpected end of data at byte {position} (needed {needed} more)")]
    UnexpectedEof { position: usize, needed: usize },

    #[error("Unknown record kind tag {0:#04x}")]
    UnknownKind(u8),

    #[error("Record kind {kind} expects {expected} fields, found {found}")]
    FieldCount {
        kind: &'static str,
        expected: u8,
        found: u8,
    },

    #[error("Negative string length {0}")]
    NegativeLength(i32),

    #[error("String at byte {position} is not valid UTF-8")]
    InvalidUtf8 { position: usize },

    #[error("Record identifier {found} does not match its header entry {expected}")]
    IdentifierMismatch {
        expected: Identifier,
        found: Identifier,
    },
}

/// A worker that stopped before finishing its partition.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker {worker} failed to read the pack: {source}")]
    Io {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {worker} panicked: {message}")]
    Panicked { worker: usize, message: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed pack: {0}")]
    Format(#[from] FormatError),

    #[error("Blueprint load already started")]
    AlreadyStarted,

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
