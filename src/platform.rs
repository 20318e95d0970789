//! Platform capability table.
//!
//! Behavior that genuinely differs between POSIX-like and Windows-like systems
//! is listed here once. The factory and the region consult this table instead
//! of scattering `cfg` checks through the call paths, and report anything the
//! table marks as missing with [`RegionError::Unsupported`](crate::RegionError::Unsupported).

use crate::utils::{allocation_granularity, page_size};

/// What the current platform supports for memory-mapped regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// System page size in bytes.
    pub page_size: usize,
    /// Alignment required for a file mapping's base offset.
    pub allocation_granularity: usize,
    /// Private copy-on-write mappings.
    pub copy_on_write: bool,
    /// POSIX-style protection and sharing flags on the factory.
    pub protection_flags: bool,
    /// Anonymous mappings shared by name within and across processes.
    pub tagged_anonymous: bool,
    /// Over-length file mappings are rejected instead of extending the file.
    pub strict_length: bool,
    /// Resize of file-backed regions.
    pub resize_file: bool,
    /// Resize of untagged anonymous regions. Tagged regions never resize.
    pub resize_anonymous: bool,
    /// The old view must be released before the backing file can be truncated.
    ///
    /// When set, a failed remap leaves the region closed rather than restored.
    pub unmap_before_truncate: bool,
}

/// Capabilities of the platform this crate was compiled for.
#[must_use]
pub fn capabilities() -> Capabilities {
    Capabilities {
        page_size: page_size(),
        allocation_granularity: allocation_granularity(),
        copy_on_write: true,
        protection_flags: cfg!(unix),
        tagged_anonymous: cfg!(unix),
        strict_length: !cfg!(windows),
        resize_file: true,
        resize_anonymous: true,
        unmap_before_truncate: cfg!(windows),
    }
}
