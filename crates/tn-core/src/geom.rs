//! Planar geometry primitives: points and immutable polylines.
//!
//! # Conventions
//!
//! Coordinates are metres in an arbitrary planar frame.  A polyline's
//! *design direction* runs from its first to its last point.  Lateral offsets
//! follow the traffic convention used throughout the workspace: **LEFT is the
//! positive offset direction** (the left normal of the local direction of
//! travel), RIGHT is negative.
//!
//! Polylines are immutable after construction; offset operations return new
//! polylines.  Cumulative segment lengths are computed once so positional
//! queries are a binary search plus a lerp.

use crate::error::{CoreError, CoreResult};

// ── Point2 ────────────────────────────────────────────────────────────────────

/// A planar point (or free vector) in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Linear interpolation: `self` at `f = 0.0`, `other` at `f = 1.0`.
    #[inline]
    pub fn lerp(self, other: Point2, f: f64) -> Point2 {
        Point2::new(self.x + (other.x - self.x) * f, self.y + (other.y - self.y) * f)
    }

    /// The left normal of this vector (rotation by +90°), unnormalized.
    #[inline]
    pub fn left_normal(self) -> Point2 {
        Point2::new(-self.y, self.x)
    }

    #[inline]
    fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    fn normalized(self) -> Point2 {
        let n = self.norm();
        if n == 0.0 { self } else { Point2::new(self.x / n, self.y / n) }
    }
}

impl std::ops::Add for Point2 {
    type Output = Point2;
    #[inline]
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2 {
    type Output = Point2;
    #[inline]
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point2 {
    type Output = Point2;
    #[inline]
    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Polyline ──────────────────────────────────────────────────────────────────

/// An immutable 2-D polyline with cached cumulative lengths.
///
/// Used as the design line of a link and as the derived center line and
/// boundary lines of cross-section elements.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    points: Vec<Point2>,
    /// `cumulative[i]` = length of the polyline up to and including vertex `i`.
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Construct from at least two points with strictly positive total length.
    pub fn new(points: Vec<Point2>) -> CoreResult<Self> {
        if points.len() < 2 {
            return Err(CoreError::TooFewPoints(points.len()));
        }
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in points.windows(2) {
            total += w[0].distance(w[1]);
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(CoreError::ZeroLength);
        }
        Ok(Self { points, cumulative })
    }

    /// Convenience: the straight segment from `a` to `b`.
    pub fn straight(a: Point2, b: Point2) -> CoreResult<Self> {
        Self::new(vec![a, b])
    }

    #[inline]
    pub fn length(&self) -> f64 {
        *self.cumulative.last().unwrap_or(&0.0)
    }

    #[inline]
    pub fn first(&self) -> Point2 {
        self.points[0]
    }

    #[inline]
    pub fn last(&self) -> Point2 {
        self.points[self.points.len() - 1]
    }

    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Locate the segment containing `distance` along the line.
    /// Returns `(segment index, local fraction within that segment)`.
    fn segment_at(&self, distance: f64) -> (usize, f64) {
        let d = distance.clamp(0.0, self.length());
        // Binary search over the cumulative lengths.
        let i = match self.cumulative.binary_search_by(|c| c.total_cmp(&d)) {
            Ok(i) => i.min(self.points.len() - 2),
            Err(i) => i.saturating_sub(1).min(self.points.len() - 2),
        };
        let seg_len = self.cumulative[i + 1] - self.cumulative[i];
        let t = if seg_len > 0.0 { (d - self.cumulative[i]) / seg_len } else { 0.0 };
        (i, t)
    }

    /// The point at the given fraction of the total length, clamped to [0, 1].
    pub fn point_at_fraction(&self, fraction: f64) -> Point2 {
        let (i, t) = self.segment_at(fraction * self.length());
        self.points[i].lerp(self.points[i + 1], t)
    }

    /// Unit direction vector at the given fraction (direction of the local
    /// segment; at a vertex, the direction of the following segment).
    pub fn direction_at_fraction(&self, fraction: f64) -> Point2 {
        let (i, _) = self.segment_at(fraction * self.length());
        (self.points[i + 1] - self.points[i]).normalized()
    }

    /// Unit direction at vertex `i`: the average of the adjacent segment
    /// directions, so offset lines stay continuous around corners.
    fn vertex_direction(&self, i: usize) -> Point2 {
        let n = self.points.len();
        if i == 0 {
            (self.points[1] - self.points[0]).normalized()
        } else if i == n - 1 {
            (self.points[n - 1] - self.points[n - 2]).normalized()
        } else {
            let a = (self.points[i] - self.points[i - 1]).normalized();
            let b = (self.points[i + 1] - self.points[i]).normalized();
            let sum = a + b;
            if sum.norm() > 0.0 { sum.normalized() } else { b }
        }
    }

    /// Offset line with an offset varying linearly from `begin` (at the first
    /// point) to `end` (at the last point).  Positive offsets are to the LEFT
    /// of the design direction.
    pub fn offset_line(&self, begin: f64, end: f64) -> CoreResult<Polyline> {
        self.offset_line_at(&[0.0, 1.0], &[begin, end])
    }

    /// Offset line with a piecewise-linear offset profile.
    ///
    /// `fractions` must be strictly increasing, starting at 0.0 and ending at
    /// 1.0; `offsets` supplies the lateral offset at each control fraction.
    pub fn offset_line_at(&self, fractions: &[f64], offsets: &[f64]) -> CoreResult<Polyline> {
        if fractions.len() != offsets.len() || fractions.is_empty() {
            return Err(CoreError::MismatchedProfile {
                fractions: fractions.len(),
                offsets: offsets.len(),
            });
        }
        if fractions.len() == 1 {
            // Constant offset.
            return self.offset_line_at(&[0.0, 1.0], &[offsets[0], offsets[0]]);
        }
        if fractions[0] != 0.0
            || fractions[fractions.len() - 1] != 1.0
            || fractions.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(CoreError::NonMonotonicFractions);
        }

        let total = self.length();
        let offset_at = |fraction: f64| -> f64 {
            // fractions is small; a linear scan is fine.
            let mut i = 0;
            while i + 2 < fractions.len() && fraction > fractions[i + 1] {
                i += 1;
            }
            let span = fractions[i + 1] - fractions[i];
            let local = ((fraction - fractions[i]) / span).clamp(0.0, 1.0);
            offsets[i] + (offsets[i + 1] - offsets[i]) * local
        };

        // Sample at every vertex and at every interior control fraction, so
        // an offset breakpoint between two vertices still shows up in the
        // output geometry.
        let mut out = Vec::with_capacity(self.points.len() + fractions.len());
        let mut ctrl = fractions[1..fractions.len() - 1].iter().copied().peekable();
        for (i, &p) in self.points.iter().enumerate() {
            let vf = self.cumulative[i] / total;
            while let Some(&f) = ctrl.peek() {
                if f >= vf - 1e-12 {
                    break;
                }
                ctrl.next();
                let q = self.point_at_fraction(f);
                let normal = self.direction_at_fraction(f).left_normal();
                out.push(q + normal * offset_at(f));
            }
            if let Some(&f) = ctrl.peek()
                && (f - vf).abs() <= 1e-12
            {
                ctrl.next();
            }
            let normal = self.vertex_direction(i).left_normal();
            out.push(p + normal * offset_at(vf));
        }
        Polyline::new(out)
    }

    /// The same polyline traversed in the opposite direction.
    pub fn reversed(&self) -> Polyline {
        let mut points = self.points.clone();
        points.reverse();
        let total = self.length();
        let cumulative = self.cumulative.iter().rev().map(|c| total - c).collect();
        Polyline { points, cumulative }
    }
}
