//! Tag-named anonymous mappings backed by POSIX shared memory.
//!
//! Every region opened with the same tag maps the same shared-memory object,
//! so writes through one are visible through the others, in this process or
//! another. The process that creates the object sizes it and owns its name:
//! the name is unlinked once the creator's last region holding the tag is
//! closed. Openers never resize or unlink.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::fs::File;
use std::io;
use std::os::unix::io::FromRawFd;
use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::Mutex;

use crate::errors::{RegionError, Result};

/// How often an opener re-checks an object whose creator has not sized it yet.
const SIZE_POLL_ATTEMPTS: u32 = 200;
const SIZE_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Holders {
    regions: usize,
    // This process created the object currently behind the name.
    created: bool,
}

fn registry() -> &'static Mutex<HashMap<String, Holders>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Holders>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Keeps a tag registered while a region maps it.
#[derive(Debug)]
pub(crate) struct TagLease {
    tag: String,
    name: CString,
}

impl TagLease {
    fn acquire(tag: &str, name: CString, created: bool) -> Self {
        let mut map = registry().lock();
        let holders = map.entry(tag.to_owned()).or_default();
        holders.regions += 1;
        holders.created |= created;
        Self { tag: tag.to_owned(), name }
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }
}

impl Drop for TagLease {
    fn drop(&mut self) {
        let mut map = registry().lock();
        let Some(holders) = map.get_mut(&self.tag) else {
            return;
        };
        holders.regions -= 1;
        if holders.regions > 0 {
            return;
        }
        let created = holders.created;
        map.remove(&self.tag);
        if !created {
            log::debug!("released shared tag {:?}, name left to its creator", self.tag);
            return;
        }
        // SAFETY: `name` is a valid NUL-terminated string.
        let rc = unsafe { libc::shm_unlink(self.name.as_ptr()) };
        if rc != 0 {
            log::debug!(
                "shm_unlink for tag {:?} failed: {}",
                self.tag,
                io::Error::last_os_error()
            );
        } else {
            log::debug!("released and unlinked shared tag {:?}", self.tag);
        }
    }
}

/// Check a tag before any OS call.
pub(crate) fn validate(tag: &str) -> Result<CString> {
    if tag.is_empty() || tag.contains('/') {
        return Err(RegionError::InvalidArgument(format!(
            "tag {tag:?} must be non-empty and must not contain '/'"
        )));
    }
    CString::new(format!("/{tag}"))
        .map_err(|_| RegionError::InvalidArgument(format!("tag {tag:?} contains a NUL byte")))
}

fn shm_open(name: &CStr, flags: libc::c_int) -> io::Result<File> {
    cfg_if::cfg_if! {
        if #[cfg(any(target_os = "macos", target_os = "ios"))] {
            let mode = 0o600 as libc::c_uint;
        } else {
            let mode = 0o600 as libc::mode_t;
        }
    }
    // SAFETY: `name` is a valid NUL-terminated string; the descriptor is checked below.
    let fd = unsafe { libc::shm_open(name.as_ptr(), flags | libc::O_CLOEXEC, mode) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` was just returned by shm_open and is owned by nobody else.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Create the object exclusively and size it, or `None` if it already exists.
fn create(name: &CStr, len: u64) -> Result<Option<File>> {
    let file = match shm_open(name, libc::O_RDWR | libc::O_CREAT | libc::O_EXCL) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if let Err(e) = file.set_len(len) {
        // SAFETY: `name` is a valid NUL-terminated string.
        unsafe { libc::shm_unlink(name.as_ptr()) };
        return Err(e.into());
    }
    Ok(Some(file))
}

/// Open an existing object once its creator has sized it.
///
/// `Ok(None)` means the name vanished between the failed create and this open.
fn open_existing(name: &CStr) -> Result<Option<(File, u64)>> {
    let file = match shm_open(name, libc::O_RDWR) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    for _ in 0..SIZE_POLL_ATTEMPTS {
        let existing = file.metadata()?.len();
        if existing > 0 {
            return Ok(Some((file, existing)));
        }
        std::thread::sleep(SIZE_POLL_INTERVAL);
    }
    Err(io::Error::new(
        io::ErrorKind::WouldBlock,
        "shared object was never sized by its creator",
    )
    .into())
}

/// Open (creating if needed) the shared object behind `tag`, sized for at least `len` bytes.
///
/// A request larger than the extent already bound to the tag fails with
/// `TagSizeMismatch`; a smaller or equal request binds to the existing object.
pub(crate) fn open(tag: &str, name: CString, len: u64) -> Result<(File, TagLease)> {
    loop {
        if let Some(file) = create(&name, len)? {
            log::debug!("created shared tag {tag:?} with {len} bytes");
            let lease = TagLease::acquire(tag, name, true);
            return Ok((file, lease));
        }
        let Some((file, existing)) = open_existing(&name)? else {
            continue;
        };
        if len > existing {
            return Err(RegionError::TagSizeMismatch {
                tag: tag.to_owned(),
                requested: len,
                existing,
            });
        }
        let lease = TagLease::acquire(tag, name, false);
        return Ok((file, lease));
    }
}
