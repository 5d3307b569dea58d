//! Blueprint pack file format.
//!
//! ```text
//! i32 LE            record count
//! count × {
//!     [u8; 16]      identifier
//!     u32 LE        absolute offset of the record body
//! }
//! data region       record bodies (see `codec`)
//! ```

mod codec;
mod header;
mod writer;

pub use codec::*;
pub use header::*;
pub use writer::*;
