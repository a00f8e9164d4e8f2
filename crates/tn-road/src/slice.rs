//! Cross-section slices: how offset and width vary along an element.
//!
//! A slice is a `(relative length, lateral offset, width)` sample.  An
//! element carries at least one slice; the first sits at relative length 0
//! and the last — when there is more than one — at the full link length.
//! Queries interpolate between the bracketing pair:
//!
//! - 1 slice: constant value.
//! - 2 slices: linear over the whole `[0, 1]` fraction range.
//! - 3+ slices: locate the bracketing pair by position and interpolate on
//!   the local fraction within that pair; positions past the last pair
//!   clamp against it rather than extrapolate.

use crate::error::{RoadError, RoadResult};

/// One `(relative length, offset, width)` sample.  Lengths and offsets in
/// metres; LEFT offsets positive.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossSectionSlice {
    /// Position along the link, metres from the start node.
    pub relative_length: f64,
    /// Lateral offset of the element center from the design line.
    pub offset: f64,
    /// Element width at this position.
    pub width: f64,
}

impl CrossSectionSlice {
    pub fn new(relative_length: f64, offset: f64, width: f64) -> Self {
        Self { relative_length, offset, width }
    }
}

/// Absolute tolerance when checking that the last slice sits at the link
/// length.
const END_TOLERANCE: f64 = 1e-6;

/// A validated, ordered slice list for one element.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SliceProfile {
    slices: Vec<CrossSectionSlice>,
    /// Link length the slice positions are measured against.
    total: f64,
}

impl SliceProfile {
    /// Validate and adopt a slice list.  `element` is only used in error
    /// payloads.
    pub fn new(
        element: &str,
        slices: Vec<CrossSectionSlice>,
        link_length: f64,
    ) -> RoadResult<Self> {
        let Some(first) = slices.first() else {
            return Err(RoadError::EmptySliceList(element.to_owned()));
        };
        if first.relative_length != 0.0 {
            return Err(RoadError::SliceStart {
                element: element.to_owned(),
                position: first.relative_length,
            });
        }
        if slices
            .windows(2)
            .any(|w| w[0].relative_length >= w[1].relative_length)
        {
            return Err(RoadError::SliceOrder(element.to_owned()));
        }
        if slices.len() > 1 {
            let last = slices[slices.len() - 1].relative_length;
            if (last - link_length).abs() > END_TOLERANCE {
                return Err(RoadError::SliceEnd {
                    element: element.to_owned(),
                    expected: link_length,
                    got: last,
                });
            }
        }
        Ok(Self { slices, total: link_length })
    }

    pub fn slices(&self) -> &[CrossSectionSlice] {
        &self.slices
    }

    /// Slice positions as fractions of the link length, for offset-line
    /// construction.  A single-slice profile yields `[0.0]`; the last
    /// fraction is snapped to exactly 1.0 (the end position is validated to
    /// within [`END_TOLERANCE`], not to the bit).
    pub fn fractions(&self) -> Vec<f64> {
        let mut fractions: Vec<f64> = self
            .slices
            .iter()
            .map(|s| if self.total > 0.0 { s.relative_length / self.total } else { 0.0 })
            .collect();
        if let [.., last] = fractions.as_mut_slice()
            && self.slices.len() > 1
        {
            *last = 1.0;
        }
        fractions
    }

    pub fn offsets(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.offset).collect()
    }

    fn value_at(&self, fraction: f64, value: impl Fn(&CrossSectionSlice) -> f64) -> f64 {
        let n = self.slices.len();
        if n == 1 {
            return value(&self.slices[0]);
        }
        let pos = fraction.clamp(0.0, 1.0) * self.total;
        // Bracketing pair, clamped to the final pair.
        let mut i = 0;
        while i + 2 < n && pos > self.slices[i + 1].relative_length {
            i += 1;
        }
        let lo = &self.slices[i];
        let hi = &self.slices[i + 1];
        let span = hi.relative_length - lo.relative_length;
        let local = if span > 0.0 {
            ((pos - lo.relative_length) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        value(lo) + (value(hi) - value(lo)) * local
    }

    /// Width at a fraction of the element length, clamped to `[0, 1]`.
    pub fn width_at(&self, fraction: f64) -> f64 {
        self.value_at(fraction, |s| s.width)
    }

    /// Lateral center offset at a fraction of the element length.
    pub fn offset_at(&self, fraction: f64) -> f64 {
        self.value_at(fraction, |s| s.offset)
    }

    pub fn begin_width(&self) -> f64 {
        self.slices[0].width
    }

    pub fn end_width(&self) -> f64 {
        self.slices[self.slices.len() - 1].width
    }

    pub fn begin_offset(&self) -> f64 {
        self.slices[0].offset
    }

    pub fn end_offset(&self) -> f64 {
        self.slices[self.slices.len() - 1].offset
    }
}
