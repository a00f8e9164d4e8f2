//! Cross-section elements: lanes, shoulders, and stripes.
//!
//! An element belongs to exactly one cross-section link.  Its geometry — the
//! center line (the design line displaced by the slice offsets), the closed
//! contour, and the begin/end widths and offsets — is derived once at
//! construction and immutable thereafter.

use tn_core::{LinkId, Point2, Polyline};

use crate::error::RoadResult;
use crate::lane::LaneData;
use crate::slice::SliceProfile;
use crate::stripe::StripeData;

/// A lateral side, LEFT being the positive-offset side of the design line.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LateralDirectionality {
    Left,
    Right,
}

impl LateralDirectionality {
    pub fn flip(self) -> LateralDirectionality {
        match self {
            LateralDirectionality::Left => LateralDirectionality::Right,
            LateralDirectionality::Right => LateralDirectionality::Left,
        }
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Derived element geometry, computed once at construction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossSectionGeometry {
    profile: SliceProfile,
    center_line: Polyline,
    /// Closed contour: left boundary, then right boundary reversed.
    contour: Vec<Point2>,
    length: f64,
}

impl CrossSectionGeometry {
    /// Derive the center line and contour from a link design line and a
    /// validated slice profile.
    pub fn derive(design_line: &Polyline, profile: SliceProfile) -> RoadResult<Self> {
        let fractions = profile.fractions();
        let offsets = profile.offsets();
        let center_line = design_line.offset_line_at(&fractions, &offsets)?;

        let widths: Vec<f64> = profile.slices().iter().map(|s| s.width).collect();
        let left: Vec<f64> = offsets.iter().zip(&widths).map(|(o, w)| o + w / 2.0).collect();
        let right: Vec<f64> = offsets.iter().zip(&widths).map(|(o, w)| o - w / 2.0).collect();
        let left_line = design_line.offset_line_at(&fractions, &left)?;
        let right_line = design_line.offset_line_at(&fractions, &right)?;

        let mut contour = left_line.points().to_vec();
        contour.extend(right_line.points().iter().rev());
        contour.push(left_line.first());

        let length = center_line.length();
        Ok(Self { profile, center_line, contour, length })
    }

    pub fn profile(&self) -> &SliceProfile {
        &self.profile
    }

    pub fn center_line(&self) -> &Polyline {
        &self.center_line
    }

    pub fn contour(&self) -> &[Point2] {
        &self.contour
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width_at(&self, fraction: f64) -> f64 {
        self.profile.width_at(fraction)
    }

    /// Lateral center offset from the design line.
    pub fn offset_at(&self, fraction: f64) -> f64 {
        self.profile.offset_at(fraction)
    }

    /// Lateral offset of the element's edge on the given side.
    pub fn boundary_at(&self, side: LateralDirectionality, fraction: f64) -> f64 {
        let half = self.width_at(fraction) / 2.0;
        match side {
            LateralDirectionality::Left => self.offset_at(fraction) + half,
            LateralDirectionality::Right => self.offset_at(fraction) - half,
        }
    }
}

// ── Element ───────────────────────────────────────────────────────────────────

/// What an element is, and the data that comes with that role.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Lane(LaneData),
    Shoulder,
    Stripe(StripeData),
}

/// One cross-section element.  The id is unique within its parent link.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    id: String,
    link: LinkId,
    geometry: CrossSectionGeometry,
    kind: ElementKind,
}

impl Element {
    pub(crate) fn new(
        id: String,
        link: LinkId,
        geometry: CrossSectionGeometry,
        kind: ElementKind,
    ) -> Self {
        Self { id, link, geometry, kind }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn geometry(&self) -> &CrossSectionGeometry {
        &self.geometry
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_lane(&self) -> bool {
        matches!(self.kind, ElementKind::Lane(_))
    }

    pub fn as_lane(&self) -> Option<&LaneData> {
        match &self.kind {
            ElementKind::Lane(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn as_lane_mut(&mut self) -> Option<&mut LaneData> {
        match &mut self.kind {
            ElementKind::Lane(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_stripe(&self) -> Option<&StripeData> {
        match &self.kind {
            ElementKind::Stripe(s) => Some(s),
            _ => None,
        }
    }
}
