//! # mmap-region: memory-mapped byte regions for Rust
//!
//! This crate exposes a region of a file, or of anonymous OS memory, as a
//! randomly addressable byte sequence while hiding platform differences in
//! mapping creation, protection, resizing, and teardown.
//!
//! ## Features
//!
//! - **Three access modes**: read-only, shared read-write, and private copy-on-write
//! - **Sequence-style access**: negative indices, ranges, and strided slices
//! - **Cursor I/O**: `seek`/`tell`/`read`/`write` over the mapped bytes
//! - **Search**: `find`/`rfind` over raw bytes, zero bytes included
//! - **Safe resize**: remaps and truncates the backing file without dangling views
//! - **Idempotent close**: closing twice is a no-op, never a fault
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::OpenOptions;
//! use std::io::SeekFrom;
//! use mmap_region::MapOptions;
//!
//! let file = OpenOptions::new().read(true).write(true).open("data.bin")?;
//!
//! // Map the whole file
//! let region = MapOptions::new().map(&file)?;
//!
//! region.seek(SeekFrom::Start(100))?;
//! region.write(b"Hello, mmap!")?;
//! assert_eq!(region.find(b"mmap", None, None)?, Some(107));
//!
//! // Ensure data is persisted
//! region.flush()?;
//! region.close();
//! # Ok::<(), mmap_region::RegionError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error types and their classification
//! - [`utils`]: Page size, allocation granularity, and bounds helpers
//! - [`platform`]: What the current platform supports
//! - [`slice`]: `start:stop:step` selections
//! - [`options`]: The builder that validates parameters and creates regions
//! - [`region`]: Core `MappedRegion` implementation
//!
//! ## Feature Flags
//!
//! - `advise` (default): Enables `MappedRegion::advise`

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]

pub mod errors;
pub mod utils;
pub mod platform;
pub mod slice;
pub mod options;
pub mod region;

mod search;
#[cfg(unix)]
mod tag;

#[cfg(feature = "advise")]
pub mod advise;

pub use errors::{ErrorKind, RegionError, Result};
pub use options::{MapOptions, Protection, Sharing};
pub use platform::{capabilities, Capabilities};
pub use region::{AccessMode, MappedRegion};
pub use slice::{Slice, SliceIndices};

#[cfg(feature = "advise")]
pub use advise::MmapAdvice;
