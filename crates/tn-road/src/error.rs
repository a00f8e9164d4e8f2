//! Road-layer error type.
//!
//! Geometric inconsistencies are rejected at construction time, so no live
//! lane or element can exist in an inconsistent state.  Topology failures
//! from the network layer pass through as [`RoadError::Network`].

use thiserror::Error;

use tn_core::{CoreError, ElementId};
use tn_network::NetworkError;

/// Errors produced by `tn-road`.
#[derive(Debug, Error)]
pub enum RoadError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("element {0:?} has an empty slice list")]
    EmptySliceList(String),

    #[error("element {element:?}: first slice must sit at 0, found {position}")]
    SliceStart { element: String, position: f64 },

    #[error("element {element:?}: last slice must sit at the link length {expected}, found {got}")]
    SliceEnd { element: String, expected: f64, got: f64 },

    #[error("element {0:?}: slice positions must be strictly increasing")]
    SliceOrder(String),

    #[error("element id {element:?} already exists on link {link:?}")]
    DuplicateElement { link: String, element: String },

    #[error("link {0:?} has no cross section")]
    NotACrossSectionLink(String),

    #[error("element {0} is not a lane")]
    NotALane(ElementId),

    #[error("invalid element handle {0}")]
    InvalidElement(ElementId),

    #[error("lane {element:?} directionality is not permitted by link {link:?}")]
    DirectionalityConflict { element: String, link: String },

    #[error("sensor {sensor:?} position {position} outside lane length {length}")]
    SensorPosition { sensor: String, position: f64, length: f64 },

    #[error("GTU is not on lane {0:?}")]
    GtuNotOnLane(String),
}

/// Shorthand result type for `tn-road`.
pub type RoadResult<T> = Result<T, RoadError>;
