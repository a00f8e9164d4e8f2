//! Stripe permeability: per-type, per-side crossing rules painted on the
//! road surface.
//!
//! Lookup falls back: exact GTU type, then the parent chain, then the
//! overall per-side default.  A lane boundary with no stripe at all is
//! treated as permeable by the adjacency query — that rule lives in
//! [`RoadNetwork::accessible_adjacent_lanes`](crate::RoadNetwork::accessible_adjacent_lanes),
//! not here.

use rustc_hash::FxHashMap;

use tn_core::{GtuTypeId, GtuTypes};

use crate::element::LateralDirectionality;

/// Which side(s) of a stripe a vehicle may cross towards.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Permeable {
    Left,
    Right,
    Both,
}

impl Permeable {
    pub fn permits(self, direction: LateralDirectionality) -> bool {
        match self {
            Permeable::Both => true,
            Permeable::Left => direction == LateralDirectionality::Left,
            Permeable::Right => direction == LateralDirectionality::Right,
        }
    }
}

/// Per-type permeability rules for one stripe.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StripeData {
    permeability: FxHashMap<GtuTypeId, Permeable>,
    default_left: bool,
    default_right: bool,
}

impl StripeData {
    /// A solid stripe: no crossing either way by default.
    pub fn solid() -> Self {
        Self {
            permeability: FxHashMap::default(),
            default_left: false,
            default_right: false,
        }
    }

    /// A dashed stripe: crossing permitted both ways by default.
    pub fn dashed() -> Self {
        Self {
            permeability: FxHashMap::default(),
            default_left: true,
            default_right: false,
        }
        .with_default(LateralDirectionality::Right, true)
    }

    /// Crossing permitted only towards the given side by default.
    pub fn permeable_towards(direction: LateralDirectionality) -> Self {
        Self::solid().with_default(direction, true)
    }

    fn with_default(mut self, direction: LateralDirectionality, value: bool) -> Self {
        match direction {
            LateralDirectionality::Left => self.default_left = value,
            LateralDirectionality::Right => self.default_right = value,
        }
        self
    }

    /// Builder-style: an explicit rule for one GTU type.
    pub fn rule(mut self, gtu_type: GtuTypeId, permeable: Permeable) -> Self {
        self.permeability.insert(gtu_type, permeable);
        self
    }

    /// `true` if a vehicle of `gtu_type` may cross towards `direction`.
    /// Falls back along the parent chain, then to the per-side default.
    pub fn is_permeable(
        &self,
        types: &GtuTypes,
        gtu_type: GtuTypeId,
        direction: LateralDirectionality,
    ) -> bool {
        for t in types.ancestry(gtu_type) {
            if let Some(&p) = self.permeability.get(&t) {
                return p.permits(direction);
            }
        }
        match direction {
            LateralDirectionality::Left => self.default_left,
            LateralDirectionality::Right => self.default_right,
        }
    }
}
