//! # delimited
//!
//! Split a stream of delimited records into per-group spill files in a single
//! pass, then merge the groups back into one flat stream where every group is a
//! contiguous run.
//!
//! ## Key Features
//!
//! - **Single-pass grouping** - one open file at a time, no matter how many groups
//! - **Configurable group keys** - any ordered set of columns, plain or length-prefixed
//! - **Lenient codec** - space, tab or comma separated, variable field counts
//! - **Pluggable backing area** - temporary directory by default, in-memory for tests
//! - **Resumable merge** - a failed merge can be retried without duplicating output
//! - **Typed errors** - every failure is classified as configuration, storage, codec or copy
//!
//! ## Quick Start
//!
//! ```
//! use delimited::*;
//!
//! # fn main() -> delimited::Result<()> {
//! let input = "b,2\na,1\nb,3\n";
//! let mut out = Vec::new();
//!
//! let summary = split_and_merge(
//!     input.as_bytes(),
//!     &ReaderOptions::comma(),
//!     &MultiWriterConfig::new(vec![0]),
//!     &mut out,
//!     &Cancellation::new(),
//! )?;
//!
//! assert_eq!(summary.records, 3);
//! assert_eq!(out, b"a,1\nb,2\nb,3\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Group Key
//!
//! [`GroupColumns`] derives a key from a record by concatenating the selected
//! columns in order. The default [`KeyEncoding::Concatenated`] matches records
//! whose concatenations are equal even when the column boundaries differ
//! (`("a", "bc")` and `("ab", "c")` share the key `"abc"`). Use
//! [`KeyEncoding::LengthPrefixed`] when that is not wanted.
//!
//! ### MultiWriter
//!
//! [`MultiWriter`] routes each record to the storage unit named by its key. It
//! keeps exactly one unit open; a change of key flushes and closes the current
//! unit and opens (or creates) the next one. [`MultiWriter::merge`] drains all
//! units into an output sink in ascending key order and
//! [`MultiWriter::close`] removes the backing area.
//!
//! ### Backing Stores
//!
//! The [`store`] module defines [`BackingStore`] with two implementations:
//! [`TempDirStore`] (one file per unit in a private temp directory) and
//! [`MemoryStore`].
//!
//! ### Codec
//!
//! The [`io`] module wraps the `csv` crate: [`io::Reader`] pushes decoded records
//! into a callback and honors a [`Cancellation`] flag, [`io::Writer`] buffers
//! encoded records until flushed.
//!
//! ## Module Overview
//!
//! - [`multi_writer`] - grouping writer and merger
//! - [`group`] - group key derivation
//! - [`store`] - backing areas
//! - [`io`] - delimited decoder and encoder
//! - [`options`] - codec and writer configuration
//! - [`helpers`] - one-call split-and-merge
//! - [`testing`] - assertions, fault injection and mock files for tests

pub mod cancel;
pub mod error;
pub mod group;
pub mod helpers;
pub mod io;
pub mod multi_writer;
pub mod options;
pub mod record;
pub mod store;
pub mod testing;

pub use cancel::Cancellation;
pub use error::{DelimitedError, ErrorKind, Result, StorageOp};
pub use group::{GroupColumns, KeyEncoding};
pub use helpers::{SplitSummary, split_and_merge, split_and_merge_with};
pub use multi_writer::{MergeSummary, MultiWriter};
pub use options::{Delimiter, MultiWriterConfig, ReaderOptions, WriterOptions};
pub use record::Row;
pub use store::{BackingStore, MemoryStore, TempDirStore};
