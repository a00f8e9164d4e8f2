//! `tn-network` — typed network topology, connectivity, and routing.
//!
//! A directed, typed network of nodes and links with per-vehicle-type
//! connectivity rules, route objects with traversal-pointer semantics, and a
//! cached weighted shortest-path subsystem.  Lane-level geometry lives one
//! layer up in `tn-road`.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`network`]  | `Network` registry (arenas + indices), spatial queries    |
//! | [`node`]     | `Node`, `NodeKind`, connectivity overrides                |
//! | [`link`]     | `Link`, `LinkType`, directionality enums                  |
//! | [`route`]    | `Route` with the traversal pointer                        |
//! | [`routing`]  | `LinkWeight`, `RouteGraph` (CSR), Dijkstra / A*           |
//! | [`listener`] | `NetworkListener` mutation events                         |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                        |
//!
//! # Threading
//!
//! Not internally thread-safe: the model targets a single-threaded,
//! event-stepped simulation loop in which one logical thread mutates and
//! queries the topology.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public data types.      |

pub mod error;
pub mod link;
pub mod listener;
pub mod network;
pub mod node;
pub mod route;
pub mod routing;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NetworkError, NetworkResult};
pub use link::{Link, LinkType, LongitudinalDirectionality, TravelDirection};
pub use listener::{NetworkListener, NoopListener};
pub use network::{Bounds, Network};
pub use node::{Node, NodeKind};
pub use route::Route;
pub use routing::{LinkWeight, PROHIBITIVE_CONNECTOR_WEIGHT, RouteGraph};
