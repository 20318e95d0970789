//! Crate-specific error types for mmap-region.

use std::io;
use thiserror::Error;

/// Result alias for mmap-region operations.
pub type Result<T> = std::result::Result<T, RegionError>;

/// Broad classification of a [`RegionError`].
///
/// Callers that only care about *why* an operation was refused, not the exact
/// cause, can match on this instead of the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range parameters, detected without an OS call.
    Value,
    /// Single-index access outside `[0, len)`.
    Index,
    /// Mutation attempted under an access mode that forbids it.
    Capability,
    /// The underlying platform call failed.
    Os,
    /// The requested feature does not exist on this platform or backing.
    Unsupported,
}

/// Error type covering parameter validation, bounds, capability and OS failures.
#[derive(Debug, Error)]
pub enum RegionError {
    /// Wrapper for `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error returned when attempting an operation in an incompatible mode.
    #[error("invalid access mode: {0}")]
    InvalidMode(&'static str),

    /// Construction or call parameters are invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Error when a requested offset/length pair is out of bounds.
    #[error("range out of bounds: offset={offset}, len={len}, total={total}")]
    OutOfBounds {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Current length of the region.
        total: u64,
    },

    /// Single-index access outside the region.
    #[error("index out of range: index={index}, len={len}")]
    IndexOutOfRange {
        /// Index as supplied by the caller, before normalization.
        index: isize,
        /// Current length of the region.
        len: usize,
    },

    /// Seek target outside `[0, len]`.
    #[error("seek out of range: position={position}, len={len}")]
    InvalidSeek {
        /// Resulting absolute position.
        position: i128,
        /// Current length of the region.
        len: u64,
    },

    /// Slice assignment with a replacement of the wrong length.
    #[error("slice assignment length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Number of positions selected by the slice.
        expected: usize,
        /// Length of the replacement.
        actual: usize,
    },

    /// File-backed request reaching past the end of the backing store.
    #[error("mapping exceeds backing store: offset={offset}, len={len}, backing={backing}")]
    ExceedsBacking {
        /// Requested base offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Current size of the backing store.
        backing: u64,
    },

    /// A tagged anonymous mapping already exists with a smaller extent.
    #[error("tag {tag:?} is bound to {existing} bytes, {requested} requested")]
    TagSizeMismatch {
        /// The shared tag.
        tag: String,
        /// Requested length.
        requested: u64,
        /// Extent already bound to the tag.
        existing: u64,
    },

    /// Feature not available on this platform or for this backing.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Operation on a closed region.
    #[error("mapped region is closed")]
    Closed,

    /// Error when a flush operation fails.
    #[error("flush failed: {0}")]
    FlushFailed(String),

    /// Error when resizing fails at the OS level.
    #[error("resize failed: {0}")]
    ResizeFailed(String),

    /// Error when an advise call fails.
    #[error("advise failed: {0}")]
    AdviceFailed(String),
}

impl RegionError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegionError::InvalidArgument(_)
            | RegionError::OutOfBounds { .. }
            | RegionError::InvalidSeek { .. }
            | RegionError::LengthMismatch { .. }
            | RegionError::Closed => ErrorKind::Value,
            RegionError::IndexOutOfRange { .. } => ErrorKind::Index,
            RegionError::InvalidMode(_) => ErrorKind::Capability,
            RegionError::Unsupported(_) => ErrorKind::Unsupported,
            RegionError::Io(_)
            | RegionError::ExceedsBacking { .. }
            | RegionError::TagSizeMismatch { .. }
            | RegionError::FlushFailed(_)
            | RegionError::ResizeFailed(_)
            | RegionError::AdviceFailed(_) => ErrorKind::Os,
        }
    }

    /// The OS error code carried by this error, if any.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            RegionError::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}
