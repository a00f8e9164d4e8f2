//! Notification callbacks fired by network mutators.
//!
//! All events fire synchronously *after* the mutation commits; they report
//! facts, they are not interceptable hooks.  Every method has a default
//! no-op body so implementors only override what they care about.
//!
//! # Example — mutation counter
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Counter { nodes: usize }
//!
//! impl NetworkListener for Counter {
//!     fn node_added(&mut self, _id: &str, _time: SimTime) {
//!         self.nodes += 1;
//!     }
//! }
//! ```

use tn_core::{GtuId, GtuTypeId, SimTime};

/// Observer of structural network mutations.
///
/// Payloads carry the entity's string id and the simulated time the network
/// was last told about; see [`Network::set_sim_time`](crate::Network::set_sim_time).
pub trait NetworkListener {
    fn node_added(&mut self, _id: &str, _time: SimTime) {}

    fn node_removed(&mut self, _id: &str, _time: SimTime) {}

    fn link_added(&mut self, _id: &str, _time: SimTime) {}

    fn link_removed(&mut self, _id: &str, _time: SimTime) {}

    fn route_added(&mut self, _gtu_type: GtuTypeId, _id: &str, _time: SimTime) {}

    fn route_removed(&mut self, _gtu_type: GtuTypeId, _id: &str, _time: SimTime) {}

    fn gtu_added(&mut self, _id: GtuId, _time: SimTime) {}

    fn gtu_removed(&mut self, _id: GtuId, _time: SimTime) {}
}

/// A [`NetworkListener`] that does nothing.
pub struct NoopListener;

impl NetworkListener for NoopListener {}
