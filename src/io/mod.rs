//! Decoder and encoder for delimited records.
//!
//! Both sides are thin wrappers over the `csv` crate:
//! - [`Reader`] decodes leniently (any field count, tolerant quotes) and can be
//!   driven push-style with cooperative cancellation.
//! - [`Writer`] buffers encoded records until an explicit flush.

pub mod reader;
pub mod writer;

pub use reader::Reader;
pub use writer::Writer;
