//! `tn-core` — foundational types for the `traffic-net` network model.
//!
//! This crate is a dependency of every other `tn-*` crate.  It intentionally
//! has no `tn-*` dependencies and minimal external ones (only `rustc-hash`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`ids`]   | `NodeId`, `LinkId`, `ElementId`, `GtuId`, type handles    |
//! | [`geom`]  | `Point2`, `Polyline` with lateral offset lines            |
//! | [`time`]  | `SimTime` stamp for notification events                   |
//! | [`gtu`]   | `GtuTypes` registry with parent-chain fallback            |
//! | [`error`] | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.         |

pub mod error;
pub mod geom;
pub mod gtu;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geom::{Point2, Polyline};
pub use gtu::{GtuType, GtuTypes};
pub use ids::{ElementId, GtuId, GtuTypeId, LinkId, LinkTypeId, NodeId};
pub use time::SimTime;
