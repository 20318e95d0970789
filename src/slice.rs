//! Start/stop/step selections over a region, with negative-index normalization.

use std::ops::{Bound, RangeBounds};

use crate::errors::{RegionError, Result};

/// A `start:stop:step` selection.
///
/// Omitted bounds default to the full extent in the step's direction; negative
/// bounds count from the end of the region. Out-of-range bounds are clamped,
/// never rejected.
///
/// # Examples
///
/// ```
/// use mmap_region::Slice;
///
/// // Every second byte, walking backwards from the end.
/// let s = Slice::full().with_step(-2);
/// let picked: Vec<usize> = s.indices(5)?.positions().collect();
/// assert_eq!(picked, vec![4, 2, 0]);
/// # Ok::<(), mmap_region::RegionError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    /// First position, or `None` for the start in the step's direction.
    pub start: Option<isize>,
    /// One-past-last position, or `None` for the end in the step's direction.
    pub stop: Option<isize>,
    /// Distance between positions, or `None` for 1.
    pub step: Option<isize>,
}

impl Slice {
    /// Select every byte.
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    /// Select `[start, stop)`.
    #[must_use]
    pub fn new(start: Option<isize>, stop: Option<isize>) -> Self {
        Self { start, stop, step: None }
    }

    /// Replace the step.
    #[must_use]
    pub fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolve against a sequence of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidArgument` if the step is zero.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn indices(&self, len: usize) -> Result<SliceIndices> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(RegionError::InvalidArgument("slice step cannot be zero".into()));
        }
        // Keeps `-step` representable.
        let step = step.max(-isize::MAX);
        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = self.start.map_or(if step < 0 { upper } else { lower }, clamp);
        let stop = self.stop.map_or(if step < 0 { lower } else { upper }, clamp);

        let count = if step < 0 {
            if stop < start {
                ((start - stop - 1) / -step + 1) as usize
            } else {
                0
            }
        } else if start < stop {
            ((stop - start - 1) / step + 1) as usize
        } else {
            0
        };
        Ok(SliceIndices { start, step, count })
    }

    /// Build a unit-step selection from a Rust range over signed positions.
    ///
    /// An inclusive end of `-1` means "through the last byte".
    pub fn from_range<R: RangeBounds<isize>>(range: R) -> Self {
        let start = match range.start_bound() {
            Bound::Included(&s) => Some(s),
            Bound::Excluded(&s) => Some(s.saturating_add(1)),
            Bound::Unbounded => None,
        };
        let stop = match range.end_bound() {
            Bound::Included(&-1) => None,
            Bound::Included(&e) => Some(e.saturating_add(1)),
            Bound::Excluded(&e) => Some(e),
            Bound::Unbounded => None,
        };
        Self::new(start, stop)
    }
}

/// A slice resolved against a concrete length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceIndices {
    start: isize,
    step: isize,
    count: usize,
}

impl SliceIndices {
    /// Number of selected positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// First selected position (meaningless when empty).
    #[must_use]
    pub fn start(&self) -> isize {
        self.start
    }

    /// Step between positions.
    #[must_use]
    pub fn step(&self) -> isize {
        self.step
    }

    /// The selected positions, in slice order.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn positions(&self) -> impl Iterator<Item = usize> {
        let Self { start, step, count } = *self;
        (0..count).map(move |i| (start + i as isize * step) as usize)
    }

    /// The selection as a contiguous `start..end` range when the step is 1.
    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn as_contiguous(&self) -> Option<std::ops::Range<usize>> {
        if self.step != 1 {
            return None;
        }
        if self.count == 0 {
            return Some(0..0);
        }
        let start = self.start as usize;
        Some(start..start + self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDICES: [Option<isize>; 10] = [
        Some(0),
        None,
        Some(1),
        Some(3),
        Some(19),
        Some(300),
        Some(-1),
        Some(-2),
        Some(-31),
        Some(-300),
    ];

    /// Positions by brute force: walk every candidate and keep what the clamped bounds admit.
    fn reference(len: usize, s: Slice) -> Vec<usize> {
        let len = len as isize;
        let step = s.step.unwrap_or(1);
        let norm = |b: isize| if b < 0 { b + len } else { b };
        let mut out = Vec::new();
        if step > 0 {
            let start = s.start.map_or(0, norm).clamp(0, len);
            let stop = s.stop.map_or(len, norm).clamp(0, len);
            let mut i = start;
            while i < stop {
                out.push(i as usize);
                i += step;
            }
        } else {
            let start = s.start.map_or(len - 1, norm).clamp(-1, len - 1);
            let stop = s.stop.map_or(-1, norm).clamp(-1, len - 1);
            let mut i = start;
            while i > stop {
                out.push(i as usize);
                i += step;
            }
        }
        out
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = Slice::full().with_step(0).indices(10).expect_err("zero step");
        assert_eq!(err.kind(), crate::ErrorKind::Value);
    }

    #[test]
    fn grid_matches_reference() {
        for len in [0usize, 1, 7, 256] {
            for start in INDICES {
                for stop in INDICES {
                    for step in INDICES.iter().skip(1).copied() {
                        let s = Slice { start, stop, step };
                        let got: Vec<usize> = s.indices(len).expect("indices").positions().collect();
                        assert_eq!(got, reference(len, s), "len={len} slice={s:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn extreme_step_does_not_overflow() {
        let idx = Slice::full().with_step(isize::MIN).indices(10).expect("indices");
        assert_eq!(idx.positions().collect::<Vec<_>>(), vec![9]);
        let idx = Slice::full().with_step(isize::MAX).indices(10).expect("indices");
        assert_eq!(idx.positions().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn ranges_convert() {
        assert_eq!(Slice::from_range(..), Slice::full());
        assert_eq!(Slice::from_range(2..5), Slice::new(Some(2), Some(5)));
        assert_eq!(Slice::from_range(-3..), Slice::new(Some(-3), None));
        assert_eq!(Slice::from_range(..=-1), Slice::new(None, None));
        assert_eq!(Slice::from_range(1..=3), Slice::new(Some(1), Some(4)));
    }

    #[test]
    fn contiguous_view() {
        let idx = Slice::new(Some(2), Some(6)).indices(10).expect("indices");
        assert_eq!(idx.as_contiguous(), Some(2..6));
        let idx = Slice::new(Some(6), Some(2)).indices(10).expect("indices");
        assert_eq!(idx.as_contiguous(), Some(0..0));
        let idx = Slice::full().with_step(2).indices(10).expect("indices");
        assert_eq!(idx.as_contiguous(), None);
    }
}
