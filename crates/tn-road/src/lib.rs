//! `tn-road` — the lane-level road model on top of `tn-network`.
//!
//! Cross-section links carry an ordered list of elements (lanes, shoulders,
//! stripes) whose shapes are defined by slices and derived once at
//! construction.  On top of that geometry this crate answers the lateral
//! questions: which lanes are reachable sideways given stripe permeability,
//! and which lanes continue past a node.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`network`] | `RoadNetwork`, cross sections, adjacency + next/prev lanes |
//! | [`element`] | `Element`, `ElementKind`, derived geometry                 |
//! | [`slice`]   | `CrossSectionSlice`, `SliceProfile` interpolation          |
//! | [`lane`]    | `LaneData`, sensors, `OperationalPlan`                     |
//! | [`stripe`]  | `StripeData`, `Permeable`                                  |
//! | [`error`]   | `RoadError`, `RoadResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public data types.      |

pub mod element;
pub mod error;
pub mod lane;
pub mod network;
pub mod slice;
pub mod stripe;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use element::{CrossSectionGeometry, Element, ElementKind, LateralDirectionality};
pub use error::{RoadError, RoadResult};
pub use lane::{LaneData, LongitudinalDirectionality, OperationalPlan, RelativePositionKind, Sensor};
pub use network::{
    ADJACENT_MARGIN, CrossSection, ENDPOINT_MARGIN, LaneKeepPolicy, RoadListener, RoadNetwork,
};
pub use slice::{CrossSectionSlice, SliceProfile};
pub use stripe::{Permeable, StripeData};
