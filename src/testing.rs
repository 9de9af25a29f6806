//! Testing utilities for code built on the grouping writer.
//!
//! - **Assertions**: check that merged output is grouped and complete
//! - **Faults**: a [`BackingStore`](crate::store::BackingStore) wrapper and an
//!   output sink that fail on demand, for exercising error paths
//! - **Mock I/O**: temporary delimited files and a decoder shortcut
//!
//! # Quick Start
//!
//! ```
//! use delimited::testing::*;
//! use delimited::{MultiWriter, MultiWriterConfig, ReaderOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut w = MultiWriter::new(&MultiWriterConfig::new(vec![0]))?;
//! for row in [["b", "1"], ["a", "2"], ["b", "3"]] {
//!     w.write(&row)?;
//! }
//! let mut out = Vec::new();
//! w.merge(&mut out)?;
//! w.close()?;
//!
//! let rows = parse_rows(&out, &ReaderOptions::comma())?;
//! assert_contiguous_groups(&rows, &[0]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod faults;
pub mod mock_io;

pub use assertions::*;
pub use faults::*;
pub use mock_io::*;
