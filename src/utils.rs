//! Utility helpers for page size, allocation granularity, and safe range calculations.

use crate::errors::{RegionError, Result};

/// Largest mapping length the crate will request from the OS.
pub const MAX_MAP_LEN: u64 = isize::MAX as u64;

/// Get the system page size in bytes.
#[must_use]
pub fn page_size() -> usize {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            windows_system_info().0
        } else {
            unix_page_size()
        }
    }
}

/// Alignment required for the base offset of a file mapping.
///
/// This is the page size on unix. Windows reports a coarser allocation
/// granularity (typically 64 KiB).
#[must_use]
pub fn allocation_granularity() -> usize {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            windows_system_info().1
        } else {
            unix_page_size()
        }
    }
}

/// Returns `(page size, allocation granularity)`.
#[cfg(target_os = "windows")]
fn windows_system_info() -> (usize, usize) {
    use std::mem::MaybeUninit;
    #[allow(non_snake_case)]
    #[repr(C)]
    struct SYSTEM_INFO {
        wProcessorArchitecture: u16,
        wReserved: u16,
        dwPageSize: u32,
        lpMinimumApplicationAddress: *mut core::ffi::c_void,
        lpMaximumApplicationAddress: *mut core::ffi::c_void,
        dwActiveProcessorMask: usize,
        dwNumberOfProcessors: u32,
        dwProcessorType: u32,
        dwAllocationGranularity: u32,
        wProcessorLevel: u16,
        wProcessorRevision: u16,
    }
    extern "system" {
        fn GetSystemInfo(lpSystemInfo: *mut SYSTEM_INFO);
    }
    let mut sysinfo = MaybeUninit::<SYSTEM_INFO>::uninit();
    // SAFETY: GetSystemInfo fills the whole struct and cannot fail.
    unsafe {
        GetSystemInfo(sysinfo.as_mut_ptr());
        let s = sysinfo.assume_init();
        (s.dwPageSize as usize, s.dwAllocationGranularity as usize)
    }
}

#[cfg(not(target_os = "windows"))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unix_page_size() -> usize {
    // SAFETY: sysconf with _SC_PAGESIZE is safe to call.
    unsafe {
        let page_size = libc::sysconf(libc::_SC_PAGESIZE);
        page_size.max(0) as usize
    }
}

/// Align a value down to the nearest multiple of `alignment`.
#[must_use]
pub fn align_down(value: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return value;
    }
    value - value % alignment
}

/// Whether `value` is a multiple of `alignment`.
#[must_use]
pub fn is_aligned(value: u64, alignment: u64) -> bool {
    alignment == 0 || value % alignment == 0
}

/// Ensure the requested [offset, offset+len) range is within [0, total).
/// Returns `Ok(())` if valid; otherwise an `OutOfBounds` error.
///
/// # Errors
///
/// Returns `RegionError::OutOfBounds` if the range exceeds bounds.
pub fn ensure_in_bounds(offset: u64, len: u64, total: u64) -> Result<()> {
    if offset > total {
        return Err(RegionError::OutOfBounds { offset, len, total });
    }
    let end = offset.saturating_add(len);
    if end > total {
        return Err(RegionError::OutOfBounds { offset, len, total });
    }
    Ok(())
}

/// Compute a safe byte slice range for a given total length, returning start..end as usize tuple.
///
/// # Errors
///
/// Returns `RegionError::OutOfBounds` if the requested range exceeds the total length.
#[allow(clippy::cast_possible_truncation)]
pub fn slice_range(offset: u64, len: u64, total: u64) -> Result<(usize, usize)> {
    ensure_in_bounds(offset, len, total)?;
    // Bounds are validated against total, which is itself a mapped length.
    let start = offset as usize;
    let end = (offset + len) as usize;
    Ok((start, end))
}

/// Convert a requested mapping length to `usize`, rejecting lengths no address space can hold.
///
/// # Errors
///
/// Returns `RegionError::InvalidArgument` if `len` exceeds [`MAX_MAP_LEN`].
pub fn checked_map_len(len: u64) -> Result<usize> {
    if len > MAX_MAP_LEN {
        return Err(RegionError::InvalidArgument(format!(
            "length {len} exceeds maximum safe limit of {MAX_MAP_LEN} bytes"
        )));
    }
    usize::try_from(len).map_err(|_| {
        RegionError::InvalidArgument(format!("length {len} does not fit in the address space"))
    })
}
