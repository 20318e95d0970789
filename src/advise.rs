//! Memory advise operations for optimizing OS paging behavior.

use crate::errors::{RegionError, Result};
use crate::region::MappedRegion;
use crate::utils::{align_down, page_size, slice_range};

/// Memory access pattern advice for the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmapAdvice {
    /// Normal access pattern (default).
    Normal,
    /// Random access pattern.
    Random,
    /// Sequential access pattern.
    Sequential,
    /// Will need this range soon.
    WillNeed,
}

impl MappedRegion {
    /// Advise the OS about expected access patterns for `[offset, offset + len)`.
    ///
    /// The advice is a hint and may be ignored. The range is widened down to a
    /// page boundary before it reaches the OS.
    ///
    /// # Platform-specific behavior
    ///
    /// - **Unix**: Uses `madvise` system call
    /// - **Windows**: Uses `PrefetchVirtualMemory` for `WillNeed`, no-op for others
    ///
    /// # Errors
    ///
    /// Returns `RegionError::OutOfBounds` if the range exceeds the region.
    /// Returns `RegionError::AdviceFailed` if the system call fails.
    pub fn advise(&self, advice: MmapAdvice, offset: u64, len: u64) -> Result<()> {
        self.read_state(|m| {
            let (start, end) = slice_range(offset, len, m.map.len() as u64)?;
            if start == end {
                return Ok(());
            }
            // madvise wants a page-aligned address.
            let first = m.map.as_ptr() as usize + start;
            let aligned = align_down(first, page_size());
            let length = end - start + (first - aligned);
            log::trace!("advise {advice:?} for {length} bytes at offset {start}");
            os_advise(aligned as *const u8, length, advice)
        })
    }
}

#[cfg(unix)]
fn os_advise(addr: *const u8, length: usize, advice: MmapAdvice) -> Result<()> {
    use libc::{madvise, MADV_NORMAL, MADV_RANDOM, MADV_SEQUENTIAL, MADV_WILLNEED};

    let advice_flag = match advice {
        MmapAdvice::Normal => MADV_NORMAL,
        MmapAdvice::Random => MADV_RANDOM,
        MmapAdvice::Sequential => MADV_SEQUENTIAL,
        MmapAdvice::WillNeed => MADV_WILLNEED,
    };

    // SAFETY: the range lies within pages owned by the mapping.
    let result = unsafe { madvise(addr as *mut libc::c_void, length, advice_flag) };
    if result != 0 {
        let err = std::io::Error::last_os_error();
        return Err(RegionError::AdviceFailed(format!("madvise failed: {err}")));
    }
    Ok(())
}

#[cfg(windows)]
fn os_advise(addr: *const u8, length: usize, advice: MmapAdvice) -> Result<()> {
    // Windows only supports prefetching (WillNeed equivalent)
    if !matches!(advice, MmapAdvice::WillNeed) {
        return Ok(());
    }

    #[allow(non_snake_case)]
    #[repr(C)]
    struct WIN32_MEMORY_RANGE_ENTRY {
        VirtualAddress: *mut core::ffi::c_void,
        NumberOfBytes: usize,
    }

    extern "system" {
        fn PrefetchVirtualMemory(
            hProcess: *mut core::ffi::c_void,
            NumberOfEntries: usize,
            VirtualAddresses: *const WIN32_MEMORY_RANGE_ENTRY,
            Flags: u32,
        ) -> i32;

        fn GetCurrentProcess() -> *mut core::ffi::c_void;
    }

    let entry = WIN32_MEMORY_RANGE_ENTRY {
        VirtualAddress: addr as *mut core::ffi::c_void,
        NumberOfBytes: length,
    };

    // SAFETY: PrefetchVirtualMemory is safe with valid memory range
    let result = unsafe { PrefetchVirtualMemory(GetCurrentProcess(), 1, &entry, 0) };
    if result == 0 {
        let err = std::io::Error::last_os_error();
        return Err(RegionError::AdviceFailed(format!(
            "PrefetchVirtualMemory failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn os_advise(_addr: *const u8, _length: usize, _advice: MmapAdvice) -> Result<()> {
    Ok(())
}
