//! Prelude module for convenient imports
//!
//! # Usage
//!
//! ```ignore
//! use bplib::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Service: `BlueprintLibrary`, `LoaderConfig`, `LoadReport`, `LoadState`
//! - Records: `Identifier`, `Record`, `RecordBody`, `RecordKind`, `Localized`
//! - Search: `Matches`, `RecordResolver`
//! - Error handling: `Error`, `Result`

pub use crate::config::LoaderConfig;
pub use crate::error::{Error, Result};
pub use crate::library::BlueprintLibrary;
pub use crate::loader::{LoadReport, LoadState};
pub use crate::record::{Identifier, Localized, Record, RecordBody, RecordKind};
pub use crate::search::{Matches, RecordResolver};
