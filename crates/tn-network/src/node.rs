//! Topological nodes.
//!
//! A node is a vertex of the network graph.  It records its incident links
//! (both directions, in registration order) and an optional per-GTU-type
//! connectivity override: a map from incoming link to the exact set of
//! outgoing links a vehicle of that type may continue onto.  When an
//! override is present for a type it *replaces* structural derivation
//! entirely, including the default U-turn exclusion — see
//! [`Network::next_links`](crate::Network::next_links).

use rustc_hash::FxHashMap;

use tn_core::{GtuTypeId, LinkId, Point2};

/// Whether a node is a regular vertex or an aggregate origin/destination.
///
/// Centroids may only be incident to connector links.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Plain,
    Centroid,
}

/// A vertex of the network graph.
///
/// Records are owned by the network arena; the incident-link list and the
/// connectivity overrides are mutated only through [`Network`](crate::Network)
/// methods so they stay consistent with the link arena.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    id: String,
    point: Point2,
    /// Heading in radians, counterclockwise from +x.
    heading: f64,
    kind: NodeKind,
    links: Vec<LinkId>,
    /// Per-type override: incoming link → permitted outgoing links.
    connections: FxHashMap<GtuTypeId, FxHashMap<LinkId, Vec<LinkId>>>,
}

impl Node {
    pub(crate) fn new(id: String, point: Point2, heading: f64, kind: NodeKind) -> Self {
        Self {
            id,
            point,
            heading,
            kind,
            links: Vec::new(),
            connections: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn point(&self) -> Point2 {
        self.point
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_centroid(&self) -> bool {
        self.kind == NodeKind::Centroid
    }

    /// Incident links in registration order, both directions.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// `true` if an explicit connectivity override exists for this type.
    pub fn has_connections_for(&self, gtu_type: GtuTypeId) -> bool {
        self.connections.contains_key(&gtu_type)
    }

    /// The overridden outgoing set for an incoming link, if any.  With an
    /// override present, a missing entry means "no continuation", not
    /// "fall back to structural derivation".
    pub fn connections_for(&self, gtu_type: GtuTypeId, incoming: LinkId) -> Option<&[LinkId]> {
        self.connections
            .get(&gtu_type)
            .map(|m| m.get(&incoming).map_or(&[][..], Vec::as_slice))
    }

    pub(crate) fn attach_link(&mut self, link: LinkId) {
        self.links.push(link);
    }

    pub(crate) fn detach_link(&mut self, link: LinkId) {
        self.links.retain(|&l| l != link);
        for per_type in self.connections.values_mut() {
            per_type.remove(&link);
            for outgoing in per_type.values_mut() {
                outgoing.retain(|&l| l != link);
            }
        }
    }

    pub(crate) fn add_connection(&mut self, gtu_type: GtuTypeId, incoming: LinkId, outgoing: LinkId) {
        let set = self
            .connections
            .entry(gtu_type)
            .or_default()
            .entry(incoming)
            .or_default();
        if !set.contains(&outgoing) {
            set.push(outgoing);
        }
    }
}
