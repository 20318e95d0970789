//! Sub-sequence search over raw bytes.
//!
//! The haystack is treated as arbitrary bytes: zero bytes are ordinary data.

/// Normalize a search bound against `len`: negative counts from the end, then clamp to `[0, len]`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub(crate) fn clamp_bound(bound: Option<isize>, default: usize, len: usize) -> usize {
    match bound {
        None => default,
        Some(b) if b < 0 => (b + len as isize).max(0) as usize,
        Some(b) => (b as usize).min(len),
    }
}

/// Lowest index `i` in `[start, end)` where `needle` occurs entirely inside the window.
pub(crate) fn find(haystack: &[u8], needle: &[u8], start: Option<isize>, end: Option<isize>) -> Option<usize> {
    let len = haystack.len();
    let start = clamp_bound(start, 0, len);
    let end = clamp_bound(end, len, len);
    if start > end {
        return None;
    }
    let window = &haystack[start..end];
    if needle.is_empty() {
        return Some(start);
    }
    if needle.len() > window.len() {
        return None;
    }
    window
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| start + i)
}

/// Highest index `i` in `[start, end)` where `needle` occurs entirely inside the window.
pub(crate) fn rfind(haystack: &[u8], needle: &[u8], start: Option<isize>, end: Option<isize>) -> Option<usize> {
    let len = haystack.len();
    let start = clamp_bound(start, 0, len);
    let end = clamp_bound(end, len, len);
    if start > end {
        return None;
    }
    let window = &haystack[start..end];
    if needle.is_empty() {
        return Some(end);
    }
    if needle.len() > window.len() {
        return None;
    }
    window
        .windows(needle.len())
        .rposition(|w| w == needle)
        .map(|i| start + i)
}
