//! Builder that validates mapping parameters and creates [`MappedRegion`]s.

use std::fs::File;

use memmap2::MmapOptions;

use crate::errors::{RegionError, Result};
use crate::platform::capabilities;
use crate::region::{AccessMode, Backing, MapVariant, MappedRegion};
use crate::utils::{checked_map_len, is_aligned};

/// Page protection requested for a mapping (POSIX `PROT_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// `PROT_READ`.
    Read,
    /// `PROT_READ | PROT_WRITE`.
    ReadWrite,
}

/// Sharing requested for a mapping (POSIX `MAP_SHARED` / `MAP_PRIVATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    /// Writes are visible to every mapper and reach the backing store.
    Shared,
    /// Writes are private to this mapping.
    Private,
}

impl AccessMode {
    /// Protection implied by this access mode.
    #[must_use]
    pub fn protection(self) -> Protection {
        match self {
            AccessMode::ReadOnly => Protection::Read,
            AccessMode::ReadWrite | AccessMode::CopyOnWrite => Protection::ReadWrite,
        }
    }

    /// Sharing implied by this access mode.
    #[must_use]
    pub fn sharing(self) -> Sharing {
        match self {
            AccessMode::ReadOnly | AccessMode::ReadWrite => Sharing::Shared,
            AccessMode::CopyOnWrite => Sharing::Private,
        }
    }
}

/// Parameters for creating a [`MappedRegion`].
///
/// All parameters are validated before any OS call, so a rejected request has
/// no side effects.
///
/// # Examples
///
/// ```no_run
/// use std::fs::OpenOptions;
/// use mmap_region::{AccessMode, MapOptions};
///
/// let file = OpenOptions::new().read(true).write(true).open("data.bin")?;
///
/// // Map the whole file, private to this process.
/// let region = MapOptions::new().access(AccessMode::CopyOnWrite).map(&file)?;
/// region.set(0, b'!')?;
/// # Ok::<(), mmap_region::RegionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    len: u64,
    offset: u64,
    access: Option<AccessMode>,
    protection: Option<Protection>,
    sharing: Option<Sharing>,
    tag: Option<String>,
}

impl MapOptions {
    /// Defaults: length 0 (whole file), offset 0, access derived from the backing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Length to map. For files, 0 maps everything from the offset to the end.
    #[must_use]
    pub fn len(mut self, len: u64) -> Self {
        self.len = len;
        self
    }

    /// Byte offset into the file; must be a multiple of the allocation granularity.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Access mode. Without it, a file maps read-write when its descriptor is
    /// writable and read-only otherwise; anonymous memory maps read-write.
    #[must_use]
    pub fn access(mut self, access: AccessMode) -> Self {
        self.access = Some(access);
        self
    }

    /// POSIX protection flags. Must agree with [`access`](Self::access) if both are set.
    #[must_use]
    pub fn protection(mut self, protection: Protection) -> Self {
        self.protection = Some(protection);
        self
    }

    /// POSIX sharing flags. Must agree with [`access`](Self::access) if both are set.
    #[must_use]
    pub fn sharing(mut self, sharing: Sharing) -> Self {
        self.sharing = Some(sharing);
        self
    }

    /// Share an anonymous mapping by name.
    ///
    /// Mappings opened with the same tag see the same pages. A request larger
    /// than the extent already bound to the tag fails with `TagSizeMismatch`;
    /// a smaller one binds to a prefix of it.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Access mode pinned down by the flags, or `None` to use the backing's default.
    fn requested_mode(&self) -> Result<Option<AccessMode>> {
        if let Some(access) = self.access {
            let conflict = self.protection.is_some_and(|p| p != access.protection())
                || self.sharing.is_some_and(|s| s != access.sharing());
            if conflict {
                return Err(RegionError::InvalidArgument(format!(
                    "access mode {access:?} contradicts protection {:?} / sharing {:?}",
                    self.protection, self.sharing
                )));
            }
            return Ok(Some(access));
        }
        Ok(match (self.protection, self.sharing) {
            (Some(Protection::Read), _) => Some(AccessMode::ReadOnly),
            (_, Some(Sharing::Private)) => Some(AccessMode::CopyOnWrite),
            (Some(Protection::ReadWrite), _) => Some(AccessMode::ReadWrite),
            (None, Some(Sharing::Shared) | None) => None,
        })
    }

    fn validate_common(&self) -> Result<Option<AccessMode>> {
        let caps = capabilities();
        if (self.protection.is_some() || self.sharing.is_some()) && !caps.protection_flags {
            return Err(RegionError::Unsupported("protection and sharing flags"));
        }
        let mode = self.requested_mode()?;
        if mode == Some(AccessMode::CopyOnWrite) && !caps.copy_on_write {
            return Err(RegionError::Unsupported("copy-on-write mappings"));
        }
        checked_map_len(self.len)?;
        Ok(mode)
    }

    fn validate_file_request(&self) -> Result<Option<AccessMode>> {
        let mode = self.validate_common()?;
        if self.tag.is_some() {
            return Err(RegionError::InvalidArgument("a tag only applies to anonymous mappings".into()));
        }
        let granularity = capabilities().allocation_granularity as u64;
        if !is_aligned(self.offset, granularity) {
            return Err(RegionError::InvalidArgument(format!(
                "offset {} is not a multiple of the allocation granularity ({granularity})",
                self.offset
            )));
        }
        if self.offset.checked_add(self.len).is_none() {
            return Err(RegionError::InvalidArgument("offset plus length overflows".into()));
        }
        Ok(mode)
    }

    /// Map `file`. The region keeps its own duplicate of the descriptor, so the
    /// caller may close `file` at any time.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidArgument` for contradictory flags, a misaligned
    /// offset, an empty file, or an offset at or past the end when `len` is 0.
    /// Returns `RegionError::ExceedsBacking` if the range runs past the end of the file
    /// on a platform with strict length checks.
    /// Returns `RegionError::Io` if duplicating the descriptor or mapping fails.
    pub fn map(&self, file: &File) -> Result<MappedRegion> {
        let requested = self.validate_file_request()?;
        let file = file.try_clone()?;
        self.map_owned(file, requested)
    }

    /// Map the file behind a raw descriptor, which is duplicated and never taken over.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Io` carrying the OS code (e.g. `EBADF`) if the
    /// descriptor is invalid, plus everything [`map`](Self::map) returns.
    #[cfg(unix)]
    pub fn map_raw_fd(&self, fd: std::os::unix::io::RawFd) -> Result<MappedRegion> {
        use std::os::unix::io::FromRawFd;

        let requested = self.validate_file_request()?;
        // SAFETY: F_DUPFD_CLOEXEC only reads `fd`; an invalid one yields -1 and errno.
        let dup = unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) };
        if dup < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        // SAFETY: `dup` is a fresh descriptor owned by nobody else.
        let file = unsafe { File::from_raw_fd(dup) };
        self.map_owned(file, requested)
    }

    fn map_owned(&self, file: File, requested: Option<AccessMode>) -> Result<MappedRegion> {
        let caps = capabilities();
        let mode = requested.unwrap_or_else(|| default_mode(&file));
        let backing = file.metadata()?.len();

        let len = if self.len == 0 {
            if backing == 0 {
                return Err(RegionError::InvalidArgument("cannot map an empty file".into()));
            }
            if self.offset >= backing {
                return Err(RegionError::InvalidArgument(format!(
                    "offset {} is at or past the end of the file ({backing} bytes)",
                    self.offset
                )));
            }
            backing - self.offset
        } else {
            let end = self.offset + self.len;
            if end > backing {
                if caps.strict_length || mode != AccessMode::ReadWrite {
                    return Err(RegionError::ExceedsBacking {
                        offset: self.offset,
                        len: self.len,
                        backing,
                    });
                }
                log::debug!("extending backing file from {backing} to {end} bytes");
                file.set_len(end)?;
            }
            self.len
        };
        let map_len = checked_map_len(len)?;

        let mut opts = MmapOptions::new();
        opts.offset(self.offset).len(map_len);
        // SAFETY: the range was validated against the file size above. Other
        // processes truncating the file underneath the mapping is outside what
        // any mmap wrapper can guard against.
        let map = unsafe {
            match mode {
                AccessMode::ReadOnly => MapVariant::Ro(opts.map(&file)?),
                AccessMode::ReadWrite => MapVariant::Rw(opts.map_mut(&file)?),
                AccessMode::CopyOnWrite => MapVariant::Cow(opts.map_copy(&file)?),
            }
        };
        log::debug!(
            "mapped {map_len} bytes at file offset {} ({mode:?})",
            self.offset
        );
        Ok(MappedRegion::from_parts(mode, self.offset, map, Backing::File(file)))
    }

    /// Map anonymous, zero-filled memory of the configured length.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidArgument` for a zero length, a non-zero offset,
    /// contradictory flags, or a malformed tag.
    /// Returns `RegionError::Unsupported` for tags on platforms without them.
    /// Returns `RegionError::TagSizeMismatch` if the tag is bound to a smaller extent.
    /// Returns `RegionError::Io` if the OS refuses the mapping.
    pub fn map_anon(&self) -> Result<MappedRegion> {
        let requested = self.validate_common()?;
        if self.len == 0 {
            return Err(RegionError::InvalidArgument(
                "anonymous mappings need a non-zero length".into(),
            ));
        }
        if self.offset != 0 {
            return Err(RegionError::InvalidArgument("anonymous mappings take no offset".into()));
        }
        if self.tag.is_some() && !capabilities().tagged_anonymous {
            return Err(RegionError::Unsupported("tagged anonymous mappings"));
        }
        let len = checked_map_len(self.len)?;
        let mode = requested.unwrap_or(AccessMode::ReadWrite);

        if let Some(tag) = &self.tag {
            return self.map_tagged(tag, len, mode);
        }
        let anon = MmapOptions::new().len(len).map_anon()?;
        let map = match mode {
            AccessMode::ReadOnly => MapVariant::Ro(anon.make_read_only()?),
            AccessMode::ReadWrite => MapVariant::Rw(anon),
            AccessMode::CopyOnWrite => MapVariant::Cow(anon),
        };
        log::debug!("mapped {len} anonymous bytes ({mode:?})");
        Ok(MappedRegion::from_parts(mode, 0, map, Backing::Anonymous))
    }

    #[cfg(unix)]
    fn map_tagged(&self, tag: &str, len: usize, mode: AccessMode) -> Result<MappedRegion> {
        let name = crate::tag::validate(tag)?;
        let (file, lease) = crate::tag::open(tag, name, self.len)?;
        let mut opts = MmapOptions::new();
        opts.len(len);
        // SAFETY: the shared object is at least `len` bytes, checked by `tag::open`.
        let map = unsafe {
            match mode {
                AccessMode::ReadOnly => MapVariant::Ro(opts.map(&file)?),
                AccessMode::ReadWrite => MapVariant::Rw(opts.map_mut(&file)?),
                AccessMode::CopyOnWrite => MapVariant::Cow(opts.map_copy(&file)?),
            }
        };
        log::debug!("mapped {len} bytes under tag {tag:?} ({mode:?})");
        Ok(MappedRegion::from_parts(mode, 0, map, Backing::Tagged { file, lease }))
    }

    #[cfg(not(unix))]
    fn map_tagged(&self, _tag: &str, _len: usize, _mode: AccessMode) -> Result<MappedRegion> {
        Err(RegionError::Unsupported("tagged anonymous mappings"))
    }
}

/// Read-write when the descriptor was opened for writing, read-only otherwise.
#[cfg(unix)]
fn default_mode(file: &File) -> AccessMode {
    use std::os::unix::io::AsRawFd;

    // SAFETY: F_GETFL only reads the descriptor's status flags.
    let flags = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETFL) };
    if flags >= 0 && flags & libc::O_ACCMODE == libc::O_RDONLY {
        AccessMode::ReadOnly
    } else {
        AccessMode::ReadWrite
    }
}

#[cfg(not(unix))]
fn default_mode(_file: &File) -> AccessMode {
    AccessMode::ReadWrite
}
