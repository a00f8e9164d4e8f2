//! Directed links and link types.
//!
//! A link is a directed edge between two nodes carrying a design line (the
//! reference polyline from which lane offsets are measured).  Its *type* is a
//! tag controlling vehicle-type compatibility and default directionality; the
//! directionality lookup falls back along the GTU-type parent chain, so a
//! link type that permits `ROAD_USER` in both directions automatically
//! permits `CAR` unless a more specific entry says otherwise.
//!
//! A **connector** is a link whose type carries the connector flag: it joins
//! a centroid to the real network and carries a non-negative demand weight
//! used to split flow among multiple connectors at the same centroid.

use rustc_hash::FxHashMap;

use tn_core::{GtuTypeId, GtuTypes, LinkTypeId, NodeId, Polyline};

// ── Directionality ────────────────────────────────────────────────────────────

/// The direction a vehicle actually travels, relative to the design line.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelDirection {
    /// With the design line, start node to end node.
    Forward,
    /// Against the design line, end node to start node.
    Backward,
}

impl TravelDirection {
    pub fn flip(self) -> TravelDirection {
        match self {
            TravelDirection::Forward => TravelDirection::Backward,
            TravelDirection::Backward => TravelDirection::Forward,
        }
    }
}

/// Which travel directions a link or lane permits for a GTU type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LongitudinalDirectionality {
    Forward,
    Backward,
    Both,
    #[default]
    None,
}

impl LongitudinalDirectionality {
    /// `true` if travel in `direction` is permitted.
    pub fn permits(self, direction: TravelDirection) -> bool {
        match self {
            LongitudinalDirectionality::Both => true,
            LongitudinalDirectionality::Forward => direction == TravelDirection::Forward,
            LongitudinalDirectionality::Backward => direction == TravelDirection::Backward,
            LongitudinalDirectionality::None => false,
        }
    }

    /// The directionality as seen when the design line is reversed.
    pub fn reverse(self) -> LongitudinalDirectionality {
        match self {
            LongitudinalDirectionality::Forward => LongitudinalDirectionality::Backward,
            LongitudinalDirectionality::Backward => LongitudinalDirectionality::Forward,
            other => other,
        }
    }

    pub fn is_none(self) -> bool {
        self == LongitudinalDirectionality::None
    }
}

// ── LinkType ──────────────────────────────────────────────────────────────────

/// A link type: a named tag with a connector flag and a per-GTU-type
/// directionality map.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkType {
    id: String,
    connector: bool,
    directionality: FxHashMap<GtuTypeId, LongitudinalDirectionality>,
}

impl LinkType {
    pub fn new(id: &str, connector: bool) -> Self {
        Self {
            id: id.to_owned(),
            connector,
            directionality: FxHashMap::default(),
        }
    }

    /// Builder-style: permit `gtu_type` with the given directionality.
    pub fn permit(mut self, gtu_type: GtuTypeId, dir: LongitudinalDirectionality) -> Self {
        self.directionality.insert(gtu_type, dir);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_connector(&self) -> bool {
        self.connector
    }

    /// Directionality for a GTU type, falling back along the parent chain.
    /// No entry anywhere means `None` (no travel permitted).
    pub fn directionality(
        &self,
        types: &GtuTypes,
        gtu_type: GtuTypeId,
    ) -> LongitudinalDirectionality {
        for t in types.ancestry(gtu_type) {
            if let Some(&dir) = self.directionality.get(&t) {
                return dir;
            }
        }
        LongitudinalDirectionality::None
    }
}

// ── Link ──────────────────────────────────────────────────────────────────────

/// A directed edge between two nodes.
///
/// The length is the design-line length, cached at construction.  The demand
/// weight is present exactly for connector links.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    id: String,
    start: NodeId,
    end: NodeId,
    link_type: LinkTypeId,
    design_line: Polyline,
    length: f64,
    demand_weight: Option<f64>,
}

impl Link {
    pub(crate) fn new(
        id: String,
        start: NodeId,
        end: NodeId,
        link_type: LinkTypeId,
        design_line: Polyline,
        demand_weight: Option<f64>,
    ) -> Self {
        let length = design_line.length();
        Self { id, start, end, link_type, design_line, length, demand_weight }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn link_type(&self) -> LinkTypeId {
        self.link_type
    }

    pub fn design_line(&self) -> &Polyline {
        &self.design_line
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Demand-split weight; present exactly for connectors.
    pub fn demand_weight(&self) -> Option<f64> {
        self.demand_weight
    }

    /// The node at the opposite end, given one endpoint; `None` if `node` is
    /// not an endpoint of this link.
    pub fn other_node(&self, node: NodeId) -> Option<NodeId> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    /// `true` if this link joins `a` and `b` in either orientation.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}
