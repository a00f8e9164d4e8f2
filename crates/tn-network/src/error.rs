//! Topology and consistency error taxonomy.
//!
//! Every failure is reported synchronously at the call that detected it and
//! nothing is retried internally.  [`NetworkError::NoRoute`] is a normal,
//! expected outcome of a routing query — callers branch on it rather than
//! treating it as a defect.

use thiserror::Error;

use tn_core::{CoreError, GtuId, LinkId, NodeId};

/// Errors produced by `tn-network` mutators and queries.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("id {0:?} is already registered")]
    DuplicateId(String),

    #[error("node {0:?} is not registered in this network")]
    UnknownNode(String),

    #[error("link {0:?} is not registered in this network")]
    UnknownLink(String),

    #[error("link type {0:?} is not registered in this network")]
    UnknownLinkType(String),

    #[error("route {0:?} is not registered for this GTU type")]
    UnknownRoute(String),

    #[error("GTU {0} is already registered")]
    DuplicateGtu(GtuId),

    #[error("GTU {0} is not registered in this network")]
    UnknownGtu(GtuId),

    #[error("invalid node handle {0}")]
    InvalidNode(NodeId),

    #[error("invalid link handle {0}")]
    InvalidLink(LinkId),

    #[error("node {node:?} still has {count} incident link(s); remove them first")]
    NodeHasLinks { node: String, count: usize },

    #[error("link {link:?} is not incident to node {node:?}")]
    NotIncident { link: String, node: String },

    #[error("link {link:?} does not permit this GTU type to travel via node {node:?}")]
    NotConnectable { link: String, node: String },

    #[error("non-connector link {link:?} may not terminate at centroid {node:?}")]
    CentroidEndpoint { link: String, node: String },

    #[error("connector {0:?} has no centroid endpoint")]
    ConnectorWithoutCentroid(String),

    #[error("link type {0:?} is not a connector type")]
    NotConnectorType(String),

    #[error("link type {0:?} is a connector type; use add_connector")]
    ConnectorType(String),

    #[error("connector {link:?} has negative demand weight {weight}")]
    NegativeDemandWeight { link: String, weight: f64 },

    #[error("route operation conflicts with the traversal pointer at index {index}")]
    RoutePointer { index: usize },

    #[error("route nodes {from:?} and {to:?} are not connected by a link")]
    NodesNotConnected { from: String, to: String },

    #[error("shortest-path edge at node {at:?} has no endpoint traversable by this GTU type")]
    RoutingConsistency { at: String },

    #[error("no route from {from:?} to {to:?}")]
    NoRoute { from: String, to: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Shorthand result type for `tn-network`.
pub type NetworkResult<T> = Result<T, NetworkError>;
