//! The mapped region: one live OS mapping exposed as an indexable byte sequence.

use std::fs::File;
use std::io::SeekFrom;
use std::ops::RangeBounds;
use std::sync::Arc;

use memmap2::{Mmap, MmapMut, MmapOptions};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::errors::{RegionError, Result};
use crate::options::MapOptions;
use crate::platform::capabilities;
use crate::search;
use crate::slice::{Slice, SliceIndices};
use crate::utils::{checked_map_len, slice_range};

#[cfg(unix)]
use crate::tag::TagLease;

/// Access mode for a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-only mapping.
    ReadOnly,
    /// Shared read-write mapping. Writes propagate to the backing store.
    ReadWrite,
    /// Private copy-on-write mapping. Writes stay in this view and never reach the backing store.
    CopyOnWrite,
}

impl AccessMode {
    /// Whether byte-level writes are permitted.
    #[must_use]
    pub fn is_writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

pub(crate) enum MapVariant {
    Ro(Mmap),
    Rw(MmapMut),
    /// Private, per-process copy-on-write mapping.
    Cow(MmapMut),
}

impl MapVariant {
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            MapVariant::Ro(m) => &m[..],
            MapVariant::Rw(m) | MapVariant::Cow(m) => &m[..],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[cfg(feature = "advise")]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }
}

/// What the mapping was created from.
pub(crate) enum Backing {
    /// A duplicate of the caller's descriptor; the caller's own handle stays independent.
    File(File),
    Anonymous,
    #[cfg(unix)]
    Tagged { file: File, lease: TagLease },
}

/// State that exists only while the region is open.
pub(crate) struct Mapped {
    pub(crate) map: MapVariant,
    pub(crate) backing: Backing,
    pub(crate) cursor: usize,
}

impl Mapped {
    /// Flush `[offset, offset + len)` of a shared read-write view.
    fn flush_span(&self, offset: u64, len: u64) -> Result<()> {
        let (start, end) = slice_range(offset, len, self.map.len() as u64)?;
        if start == end {
            return Ok(());
        }
        match (&self.map, &self.backing) {
            (MapVariant::Rw(_), Backing::Anonymous) => Ok(()),
            (MapVariant::Rw(map), _) => {
                log::trace!("flushing {} bytes at offset {}", end - start, start);
                map.flush_range(start, end - start)
                    .map_err(|e| RegionError::FlushFailed(e.to_string()))
            }
            (MapVariant::Ro(_) | MapVariant::Cow(_), _) => Ok(()),
        }
    }

    /// Mutable bytes, or a capability error for read-only views.
    fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.map {
            MapVariant::Ro(_) => Err(RegionError::InvalidMode("cannot write to a read-only mapping")),
            MapVariant::Rw(m) | MapVariant::Cow(m) => Ok(&mut m[..]),
        }
    }
}

pub(crate) struct Inner {
    pub(crate) mode: AccessMode,
    pub(crate) offset: u64,
    // `None` once closed.
    pub(crate) state: RwLock<Option<Mapped>>,
}

/// A memory-mapped byte region over a file or anonymous memory.
///
/// Regions are created through [`MapOptions`] (or the [`MappedRegion::anonymous`]
/// shorthand). Every operation validates its arguments before touching the
/// mapping, so a failed call never leaves a partial write behind.
///
/// # Examples
///
/// ```
/// use mmap_region::MappedRegion;
///
/// let region = MappedRegion::anonymous(16)?;
/// region.set_range(0..5, b"hello")?;
/// assert_eq!(region.find(b"llo", None, None)?, Some(2));
/// assert_eq!(region.get(-16)?, b'h');
/// region.close();
/// region.close();
/// # Ok::<(), mmap_region::RegionError>(())
/// ```
///
/// Cloning is cheap and yields another handle to the same region, cursor
/// included. Closing through any handle closes it for all of them.
#[derive(Clone)]
pub struct MappedRegion {
    pub(crate) inner: Arc<Inner>,
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("MappedRegion")
            .field("mode", &self.inner.mode)
            .field("offset", &self.inner.offset)
            .field("len", &state.as_ref().map(|m| m.map.len()))
            .field("closed", &state.is_none())
            .finish()
    }
}

#[allow(clippy::cast_sign_loss)]
fn normalize_index(index: isize, len: usize) -> Result<usize> {
    let signed_len = isize::try_from(len).unwrap_or(isize::MAX);
    let i = if index < 0 { index + signed_len } else { index };
    if i < 0 || i >= signed_len {
        return Err(RegionError::IndexOutOfRange { index, len });
    }
    Ok(i as usize)
}

fn select(bytes: &[u8], idx: &SliceIndices) -> Vec<u8> {
    match idx.as_contiguous() {
        Some(range) => bytes[range].to_vec(),
        None => idx.positions().map(|p| bytes[p]).collect(),
    }
}

fn assign(bytes: &mut [u8], idx: &SliceIndices, data: &[u8]) -> Result<()> {
    if data.len() != idx.len() {
        return Err(RegionError::LengthMismatch { expected: idx.len(), actual: data.len() });
    }
    match idx.as_contiguous() {
        Some(range) => bytes[range].copy_from_slice(data),
        None => {
            for (p, &b) in idx.positions().zip(data) {
                bytes[p] = b;
            }
        }
    }
    Ok(())
}

/// Map `[offset, offset + len)` of `file` shared read-write.
fn map_file_rw(file: &File, offset: u64, len: usize) -> Result<MmapMut> {
    // SAFETY: the caller holds the region's write lock, so no view into the
    // mapping being replaced is alive while the file is remapped.
    let map = unsafe { MmapOptions::new().offset(offset).len(len).map_mut(file)? };
    Ok(map)
}

impl MappedRegion {
    pub(crate) fn from_parts(mode: AccessMode, offset: u64, map: MapVariant, backing: Backing) -> Self {
        let inner = Inner {
            mode,
            offset,
            state: RwLock::new(Some(Mapped { map, backing, cursor: 0 })),
        };
        Self { inner: Arc::new(inner) }
    }

    /// Start building a mapping.
    #[must_use]
    pub fn options() -> MapOptions {
        MapOptions::new()
    }

    /// Map `len` bytes of zero-filled anonymous memory, shared read-write.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidArgument` if `len` is zero or too large.
    /// Returns `RegionError::Io` if the OS refuses the mapping.
    pub fn anonymous(len: u64) -> Result<Self> {
        MapOptions::new().len(len).map_anon()
    }

    pub(crate) fn read_state<T>(&self, f: impl FnOnce(&Mapped) -> Result<T>) -> Result<T> {
        let guard = self.inner.state.read();
        let mapped = guard.as_ref().ok_or(RegionError::Closed)?;
        f(mapped)
    }

    pub(crate) fn write_state<T>(&self, f: impl FnOnce(&mut Mapped) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.state.write();
        let mapped = guard.as_mut().ok_or(RegionError::Closed)?;
        f(mapped)
    }

    /// Return the access mode.
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.inner.mode
    }

    /// Byte offset into the backing store where the mapping begins.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.inner.offset
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.read().is_none()
    }

    /// The shared tag of a tagged anonymous mapping.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn tag(&self) -> Result<Option<String>> {
        self.read_state(|m| match &m.backing {
            #[cfg(unix)]
            Backing::Tagged { lease, .. } => Ok(Some(lease.tag().to_owned())),
            _ => Ok(None),
        })
    }

    /// Current length of the view in bytes.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn len(&self) -> Result<usize> {
        self.read_state(|m| Ok(m.map.len()))
    }

    /// Whether the view is empty.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Current size of the backing store.
    ///
    /// For a partial file mapping this differs from [`len`](Self::len). For an
    /// untagged anonymous mapping it equals the view length.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    /// Returns `RegionError::Io` if the backing store cannot be queried.
    pub fn size(&self) -> Result<u64> {
        self.read_state(|m| match &m.backing {
            Backing::File(file) => Ok(file.metadata()?.len()),
            #[cfg(unix)]
            Backing::Tagged { file, .. } => Ok(file.metadata()?.len()),
            Backing::Anonymous => Ok(m.map.len() as u64),
        })
    }

    /// Borrow the live mapped bytes.
    ///
    /// The guard holds the region's read lock. Every operation that takes the
    /// write lock (`set`, `set_range`, `set_strided`, `write`, `write_byte`,
    /// `move_bytes`, `read`, `read_byte`, `seek`, `resize` and `close`) waits
    /// until it is dropped, so calling one of them on the same thread while
    /// holding the guard deadlocks. Use it to run byte-oriented libraries over
    /// the mapping without copying.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn bytes(&self) -> Result<MappedRwLockReadGuard<'_, [u8]>> {
        RwLockReadGuard::try_map(self.inner.state.read(), |s| s.as_ref().map(|m| m.map.as_slice()))
            .map_err(|_| RegionError::Closed)
    }

    /// Read the byte at `index`; negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::IndexOutOfRange` unless `-len <= index < len`.
    pub fn get(&self, index: isize) -> Result<u8> {
        self.read_state(|m| {
            let bytes = m.map.as_slice();
            Ok(bytes[normalize_index(index, bytes.len())?])
        })
    }

    /// Write the byte at `index`; negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only regions.
    /// Returns `RegionError::IndexOutOfRange` unless `-len <= index < len`.
    pub fn set(&self, index: isize, value: u8) -> Result<()> {
        self.write_state(|m| {
            let bytes = m.bytes_mut()?;
            let i = normalize_index(index, bytes.len())?;
            bytes[i] = value;
            Ok(())
        })
    }

    /// Copy out a contiguous range. Bounds may be negative and are clamped.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn get_range<R: RangeBounds<isize>>(&self, range: R) -> Result<Vec<u8>> {
        self.get_strided(&Slice::from_range(range))
    }

    /// Overwrite a contiguous range with `data`, which must match its length exactly.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only regions.
    /// Returns `RegionError::LengthMismatch` if `data` does not fit the range exactly.
    pub fn set_range<R: RangeBounds<isize>>(&self, range: R, data: &[u8]) -> Result<()> {
        self.set_strided(&Slice::from_range(range), data)
    }

    /// Copy out the bytes selected by a `start:stop:step` slice, in slice order.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidArgument` for a zero step.
    pub fn get_strided(&self, slice: &Slice) -> Result<Vec<u8>> {
        self.read_state(|m| {
            let bytes = m.map.as_slice();
            let idx = slice.indices(bytes.len())?;
            Ok(select(bytes, &idx))
        })
    }

    /// Overwrite the positions selected by `slice` with `data`, in slice order.
    ///
    /// Either every selected position is written or none is.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only regions.
    /// Returns `RegionError::InvalidArgument` for a zero step.
    /// Returns `RegionError::LengthMismatch` if `data` does not match the selection length.
    pub fn set_strided(&self, slice: &Slice, data: &[u8]) -> Result<()> {
        self.write_state(|m| {
            let bytes = m.bytes_mut()?;
            let idx = slice.indices(bytes.len())?;
            assign(bytes, &idx, data)
        })
    }

    /// Lowest index in `[start, end)` where `needle` occurs, or `None`.
    ///
    /// Bounds default to the whole region and accept negative values.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn find(&self, needle: &[u8], start: Option<isize>, end: Option<isize>) -> Result<Option<usize>> {
        self.read_state(|m| Ok(search::find(m.map.as_slice(), needle, start, end)))
    }

    /// Highest index in `[start, end)` where `needle` occurs, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn rfind(&self, needle: &[u8], start: Option<isize>, end: Option<isize>) -> Result<Option<usize>> {
        self.read_state(|m| Ok(search::rfind(m.map.as_slice(), needle, start, end)))
    }

    /// Move the cursor and return its new absolute position.
    ///
    /// The cursor is left untouched if the target falls outside `[0, len]`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidSeek` for targets outside `[0, len]`.
    pub fn seek(&self, pos: SeekFrom) -> Result<u64> {
        self.write_state(|m| {
            let len = m.map.len();
            let position = match pos {
                SeekFrom::Start(n) => i128::from(n),
                SeekFrom::Current(d) => m.cursor as i128 + i128::from(d),
                SeekFrom::End(d) => len as i128 + i128::from(d),
            };
            if position < 0 || position > len as i128 {
                return Err(RegionError::InvalidSeek { position, len: len as u64 });
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let position = position as usize;
            m.cursor = position;
            Ok(position as u64)
        })
    }

    /// Current cursor position.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn tell(&self) -> Result<u64> {
        self.read_state(|m| Ok(m.cursor as u64))
    }

    /// Read up to `n` bytes at the cursor and advance past them.
    ///
    /// Returns fewer bytes near the end, and none at the end.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Closed` after close.
    pub fn read(&self, n: usize) -> Result<Vec<u8>> {
        self.write_state(|m| {
            let bytes = m.map.as_slice();
            let end = m.cursor.saturating_add(n).min(bytes.len());
            let out = bytes[m.cursor..end].to_vec();
            m.cursor = end;
            Ok(out)
        })
    }

    /// Read one byte at the cursor and advance by one.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::OutOfBounds` at the end of the region.
    pub fn read_byte(&self) -> Result<u8> {
        self.write_state(|m| {
            let bytes = m.map.as_slice();
            let b = *bytes.get(m.cursor).ok_or(RegionError::OutOfBounds {
                offset: m.cursor as u64,
                len: 1,
                total: bytes.len() as u64,
            })?;
            m.cursor += 1;
            Ok(b)
        })
    }

    /// Write all of `data` at the cursor and advance past it.
    ///
    /// Nothing is written if `data` would run past the end; the region never grows.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only regions.
    /// Returns `RegionError::OutOfBounds` if `data` does not fit before the end.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.write_state(|m| {
            let cursor = m.cursor;
            let bytes = m.bytes_mut()?;
            let (start, end) = slice_range(cursor as u64, data.len() as u64, bytes.len() as u64)?;
            bytes[start..end].copy_from_slice(data);
            m.cursor = end;
            Ok(())
        })
    }

    /// Write one byte at the cursor and advance by one.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only regions.
    /// Returns `RegionError::OutOfBounds` at the end of the region.
    pub fn write_byte(&self, value: u8) -> Result<()> {
        self.write(&[value])
    }

    /// Copy `count` bytes from `src` to `dest` within the region. The ranges may overlap.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only regions.
    /// Returns `RegionError::OutOfBounds` if either range leaves the region.
    pub fn move_bytes(&self, dest: usize, src: usize, count: usize) -> Result<()> {
        self.write_state(|m| {
            let bytes = m.bytes_mut()?;
            let total = bytes.len() as u64;
            let (from, to) = slice_range(src as u64, count as u64, total)?;
            slice_range(dest as u64, count as u64, total)?;
            bytes.copy_within(from..to, dest);
            Ok(())
        })
    }

    /// Flush the whole region to the backing store. No-op for read-only and copy-on-write regions.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::FlushFailed` if the OS reports a failure.
    pub fn flush(&self) -> Result<()> {
        self.read_state(|m| m.flush_span(0, m.map.len() as u64))
    }

    /// Flush `[offset, offset + len)` to the backing store.
    ///
    /// Only shared read-write mappings have anything to propagate; the range is
    /// still validated for every mode.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::OutOfBounds` if the range exceeds the region.
    /// Returns `RegionError::FlushFailed` if the OS reports a failure.
    pub fn flush_range(&self, offset: u64, len: u64) -> Result<()> {
        self.read_state(|m| m.flush_span(offset, len))
    }

    /// Change the region's length in place.
    ///
    /// Bytes in the overlap of the old and new lengths are preserved and the
    /// cursor is clamped. For file-backed regions the backing store is
    /// truncated or extended to exactly `offset + new_len`.
    ///
    /// On unix a failure leaves the region exactly as it was. Where the old
    /// view must be released before truncating (see
    /// [`Capabilities::unmap_before_truncate`](crate::Capabilities)), a failed
    /// remap leaves the region closed and reports `ResizeFailed`.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidMode` for read-only and copy-on-write regions.
    /// Returns `RegionError::Unsupported` for tagged anonymous regions.
    /// Returns `RegionError::InvalidArgument` if `new_len` is zero or too large.
    /// Returns `RegionError::Io` or `RegionError::ResizeFailed` if the OS refuses.
    pub fn resize(&self, new_len: u64) -> Result<()> {
        let caps = capabilities();
        let mut guard = self.inner.state.write();
        let (old_size, file_backed) = match guard.as_ref() {
            Some(m) => (m.map.len(), matches!(m.backing, Backing::File(_))),
            None => return Err(RegionError::Closed),
        };
        match self.inner.mode {
            AccessMode::ReadOnly => {
                return Err(RegionError::InvalidMode("cannot resize a read-only mapping"))
            }
            AccessMode::CopyOnWrite => {
                return Err(RegionError::InvalidMode("cannot resize a copy-on-write mapping"))
            }
            AccessMode::ReadWrite => {}
        }
        if new_len == 0 {
            return Err(RegionError::InvalidArgument("new length must be greater than zero".into()));
        }
        let new_size = checked_map_len(new_len)?;
        let offset = self.inner.offset;
        let total = offset
            .checked_add(new_len)
            .ok_or_else(|| RegionError::InvalidArgument("offset plus new length overflows".into()))?;
        if file_backed && caps.unmap_before_truncate {
            return Self::resize_unmapped(&mut guard, offset, total, new_size);
        }

        let mapped = guard.as_mut().ok_or(RegionError::Closed)?;

        match &mapped.backing {
            Backing::Anonymous => {
                if !caps.resize_anonymous {
                    return Err(RegionError::Unsupported("resize of anonymous mappings"));
                }
                let mut fresh = MmapOptions::new().len(new_size).map_anon()?;
                let keep = old_size.min(new_size);
                fresh[..keep].copy_from_slice(&mapped.map.as_slice()[..keep]);
                mapped.map = MapVariant::Rw(fresh);
            }
            #[cfg(unix)]
            Backing::Tagged { .. } => {
                return Err(RegionError::Unsupported("resize of tagged anonymous mappings"));
            }
            Backing::File(file) => {
                if !caps.resize_file {
                    return Err(RegionError::Unsupported("resize of file-backed mappings"));
                }
                let fresh = if new_size <= old_size {
                    // Map the smaller view first so a failure leaves the file untouched.
                    let fresh = map_file_rw(file, offset, new_size)?;
                    file.set_len(total)?;
                    fresh
                } else {
                    let old_total = file.metadata()?.len();
                    file.set_len(total)?;
                    match map_file_rw(file, offset, new_size) {
                        Ok(fresh) => fresh,
                        Err(e) => {
                            if let Err(undo) = file.set_len(old_total) {
                                log::debug!("could not restore backing size {old_total}: {undo}");
                            }
                            return Err(e);
                        }
                    }
                };
                mapped.map = MapVariant::Rw(fresh);
            }
        }
        mapped.cursor = mapped.cursor.min(new_size);
        log::debug!("resized region from {old_size} to {new_size} bytes");
        Ok(())
    }

    /// Resize path for platforms that cannot truncate a file under a live view.
    fn resize_unmapped(
        state: &mut Option<Mapped>,
        offset: u64,
        total: u64,
        new_size: usize,
    ) -> Result<()> {
        let Some(Mapped { map, backing, cursor }) = state.take() else {
            return Err(RegionError::Closed);
        };
        let file = match backing {
            Backing::File(file) => file,
            other => {
                *state = Some(Mapped { map, backing: other, cursor });
                return Err(RegionError::Unsupported("unmap-first resize of non-file mappings"));
            }
        };
        if let Err(e) = map.flush() {
            *state = Some(Mapped { map, backing: Backing::File(file), cursor });
            return Err(RegionError::FlushFailed(e.to_string()));
        }
        drop(map);
        let remapped = file
            .set_len(total)
            .map_err(RegionError::from)
            .and_then(|()| map_file_rw(&file, offset, new_size));
        match remapped {
            Ok(fresh) => {
                *state = Some(Mapped {
                    map: MapVariant::Rw(fresh),
                    backing: Backing::File(file),
                    cursor: cursor.min(new_size),
                });
                log::debug!("resized region to {new_size} bytes after unmapping");
                Ok(())
            }
            Err(e) => {
                log::debug!("remap after unmap failed, region closed: {e}");
                Err(RegionError::ResizeFailed(e.to_string()))
            }
        }
    }

    /// Release the mapping. Every later operation fails with `Closed`;
    /// repeated calls do nothing.
    pub fn close(&self) {
        let mut guard = self.inner.state.write();
        if let Some(mapped) = guard.take() {
            log::debug!("closing region of {} bytes", mapped.map.len());
            drop(mapped);
        }
    }
}

impl MapVariant {
    fn flush(&self) -> std::io::Result<()> {
        match self {
            MapVariant::Rw(m) => m.flush(),
            MapVariant::Ro(_) | MapVariant::Cow(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_normalization() {
        assert_eq!(normalize_index(0, 4).expect("first"), 0);
        assert_eq!(normalize_index(-1, 4).expect("last"), 3);
        assert_eq!(normalize_index(-4, 4).expect("first from end"), 0);
        assert!(normalize_index(4, 4).is_err());
        assert!(normalize_index(-5, 4).is_err());
        assert!(normalize_index(0, 0).is_err());
    }

    #[test]
    fn strided_assignment_is_all_or_nothing() {
        let mut bytes = *b"abcdef";
        let idx = Slice::full().with_step(2).indices(bytes.len()).expect("indices");
        let err = assign(&mut bytes, &idx, b"XY").expect_err("short");
        assert!(matches!(err, RegionError::LengthMismatch { expected: 3, actual: 2 }));
        assert_eq!(&bytes, b"abcdef");

        assign(&mut bytes, &idx, b"XYZ").expect("exact");
        assert_eq!(&bytes, b"XbYdZf");
        assert_eq!(select(&bytes, &idx), b"XYZ");
    }

    #[test]
    fn read_only_anonymous_rejects_writes_before_bounds() {
        let region = MapOptions::new()
            .len(8)
            .access(AccessMode::ReadOnly)
            .map_anon()
            .expect("anon ro");
        let err = region.set(100, 1).expect_err("ro");
        assert_eq!(err.kind(), crate::ErrorKind::Capability);
        assert_eq!(region.get(7).expect("zero"), 0);
    }
}
