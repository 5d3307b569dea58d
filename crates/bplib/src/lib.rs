//! # bplib
//!
//! Blueprint pack loader and search index.
//!
//! This crate provides:
//! - Pack file parsing (header index + record bodies) and a pack writer
//! - A parallel bulk loader that decodes a pack into a concurrent index
//! - A readiness gate that keeps searches empty until the load has finished
//! - Regex search by identifier, name and description, with per-kind field
//!   resolution
//!
//! The entry point for integration layers is [`BlueprintLibrary`].

pub mod config;
pub mod error;
pub mod index;
pub mod library;
pub mod loader;
pub mod pack;
pub mod prelude;
pub mod record;
pub mod search;

pub use config::{
    DEFAULT_WORKER_COUNT, LoaderConfig, LoaderConfigBuilder, MatchOptions, ThrottlePolicy,
};
pub use error::{DecodeError, Error, FormatError, Result, WorkerError};
pub use index::BlueprintIndex;
pub use library::BlueprintLibrary;
pub use loader::{
    DecodeFn, LoadReport, LoadState, ParallelLoader, ReadinessGate, plan_partitions,
    split_by_plan,
};
pub use pack::{
    ByteCursor, PackEntry, PackWriter, decode_entry, decode_record, encode_record, header_len,
    read_pack_index, read_pack_index_from_path,
};
pub use record::{
    FieldAccessor, FieldAccessors, FieldRegistry, Identifier, Localized, Record, RecordBody,
    RecordKind, SearchField,
};
pub use search::{Matches, RecordResolver, SearchEngine, SearchTarget};
