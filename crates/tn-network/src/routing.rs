//! Weighted shortest-path routing over the typed network.
//!
//! # Graph layout
//!
//! The per-GTU-type routing graph uses **Compressed Sparse Row (CSR)**
//! format.  Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Vertices are arena slots (tombstones get empty rows) and each registered
//! link contributes one directed edge per travel direction the GTU type is
//! permitted on it.  The search iterates a node's out-edges as a contiguous
//! memory scan.
//!
//! # Weight strategies
//!
//! [`LinkWeight`] is a closed strategy enum: plain length, length with a
//! prohibitive (large but finite) surcharge on connectors, and the connector
//! variant with a straight-line A* heuristic.  The heuristic is admissible
//! because a route can never be shorter than the straight-line distance.
//!
//! # Cache discipline
//!
//! The graph cache on [`Network`] is reused only for the canonical
//! [`LinkWeight::Length`] strategy; any other strategy rebuilds per call,
//! static or not.  A cached graph whose generation no longer matches the
//! topology is rebuilt rather than trusted.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tn_core::{GtuTypeId, LinkId, NodeId, Point2};

use crate::error::{NetworkError, NetworkResult};
use crate::link::TravelDirection;
use crate::network::Network;
use crate::route::Route;

/// Surcharge added to a connector's length by the no-connectors strategies.
/// Large enough to dominate any realistic path, finite so a connector-only
/// path is still found when nothing else exists.
pub const PROHIBITIVE_CONNECTOR_WEIGHT: f64 = 100_000.0;

// ── LinkWeight ────────────────────────────────────────────────────────────────

/// Edge-weight strategy for shortest-path queries.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkWeight {
    /// Design-line length.
    #[default]
    Length,
    /// Length, with connectors penalized by [`PROHIBITIVE_CONNECTOR_WEIGHT`].
    LengthNoConnectors,
    /// As [`LinkWeight::LengthNoConnectors`], searched with A* on the
    /// straight-line distance heuristic.
    AstarLengthNoConnectors,
}

impl LinkWeight {
    /// Weight of one link under this strategy.
    pub fn weight(self, network: &Network, link: LinkId) -> f64 {
        let Some(l) = network.link(link) else {
            return f64::INFINITY;
        };
        match self {
            LinkWeight::Length => l.length(),
            LinkWeight::LengthNoConnectors | LinkWeight::AstarLengthNoConnectors => {
                let connector = network
                    .link_type(l.link_type())
                    .is_some_and(|lt| lt.is_connector());
                if connector {
                    l.length() + PROHIBITIVE_CONNECTOR_WEIGHT
                } else {
                    l.length()
                }
            }
        }
    }

    /// Admissible lower bound on the remaining cost, if this strategy
    /// supplies one.
    pub fn heuristic(self) -> Option<fn(Point2, Point2) -> f64> {
        match self {
            LinkWeight::AstarLengthNoConnectors => Some(|a, b| a.distance(b)),
            _ => None,
        }
    }

    /// `true` if the weight of a link never changes between queries.  All
    /// current strategies are static; only [`LinkWeight::Length`] is ever
    /// cached (see the module docs).
    pub fn is_static(self) -> bool {
        true
    }
}

// ── RouteGraph ────────────────────────────────────────────────────────────────

/// A per-GTU-type directed weighted graph in CSR form.
pub struct RouteGraph {
    built_for_generation: u64,
    weight: LinkWeight,
    /// CSR row pointer; length = arena slots + 1.
    node_out_start: Vec<u32>,
    /// Per edge, sorted by source node.
    edge_to: Vec<NodeId>,
    edge_link: Vec<LinkId>,
    edge_weight: Vec<f64>,
}

impl RouteGraph {
    pub fn built_for_generation(&self) -> u64 {
        self.built_for_generation
    }

    pub fn weight(&self) -> LinkWeight {
        self.weight
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    /// Edge indices of the outgoing edges of `node`.
    #[inline]
    fn out_edges(&self, node: NodeId) -> std::ops::Range<usize> {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        start..end
    }
}

// ── Heap entry ────────────────────────────────────────────────────────────────

/// `(cost, node)` with a total order: `f64::total_cmp` on the cost, then the
/// node handle for deterministic tie-breaking.
#[derive(Copy, Clone, PartialEq)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const NO_EDGE: u32 = u32::MAX;

// ── Network routing API ───────────────────────────────────────────────────────

impl Network {
    /// Build the directed weighted graph for a GTU type under the given
    /// weight strategy: one directed edge per permitted travel direction of
    /// each registered link.  O(|V| + |E| log |E|).
    pub fn build_graph(&self, gtu_type: GtuTypeId, weight: LinkWeight) -> RouteGraph {
        let slots = self.node_slot_count();
        let mut raw: Vec<(NodeId, NodeId, LinkId, f64)> = Vec::new();
        for (id, l) in self.links() {
            let dir = self.link_directionality(gtu_type, l);
            let w = weight.weight(self, id);
            if dir.permits(TravelDirection::Forward) {
                raw.push((l.start(), l.end(), id, w));
            }
            if dir.permits(TravelDirection::Backward) {
                raw.push((l.end(), l.start(), id, w));
            }
        }
        raw.sort_unstable_by_key(|&(from, _, link, _)| (from, link));

        let mut node_out_start = vec![0u32; slots + 1];
        for &(from, _, _, _) in &raw {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=slots {
            node_out_start[i] += node_out_start[i - 1];
        }

        RouteGraph {
            built_for_generation: self.generation(),
            weight,
            node_out_start,
            edge_to: raw.iter().map(|&(_, to, _, _)| to).collect(),
            edge_link: raw.iter().map(|&(_, _, link, _)| link).collect(),
            edge_weight: raw.iter().map(|&(_, _, _, w)| w).collect(),
        }
    }

    fn node_slot_count(&self) -> usize {
        self.nodes().map(|(id, _)| id.index() + 1).max().unwrap_or(0)
    }

    /// Shortest route between two registered nodes for a GTU type.
    ///
    /// The graph is served from the per-type cache only for the canonical
    /// [`LinkWeight::Length`] strategy with a matching topology generation;
    /// everything else is rebuilt for the call.  Returns
    /// [`NetworkError::NoRoute`] when the destination is unreachable — an
    /// expected outcome, also logged at debug level.
    pub fn shortest_route(
        &mut self,
        gtu_type: GtuTypeId,
        from: NodeId,
        to: NodeId,
        weight: LinkWeight,
    ) -> NetworkResult<Route> {
        self.node_ref(from)?;
        self.node_ref(to)?;

        let cacheable = weight == LinkWeight::Length && weight.is_static();
        let graph = if cacheable {
            match self.graphs.remove(&gtu_type) {
                Some(g) if g.built_for_generation == self.generation() => g,
                _ => self.build_graph(gtu_type, weight),
            }
        } else {
            self.build_graph(gtu_type, weight)
        };
        let result = self.search(&graph, gtu_type, from, to, weight);
        if cacheable {
            self.graphs.insert(gtu_type, graph);
        }
        result
    }

    /// Shortest route visiting `via` waypoints in order.  Legs are chained
    /// point to point; any failing leg aborts the whole query with no
    /// partial result.
    pub fn shortest_route_via(
        &mut self,
        gtu_type: GtuTypeId,
        from: NodeId,
        via: &[NodeId],
        to: NodeId,
        weight: LinkWeight,
    ) -> NetworkResult<Route> {
        let id = format!(
            "{}-{}",
            self.node_ref(from)?.id(),
            self.node_ref(to)?.id()
        );
        let mut nodes = vec![from];
        let mut leg_start = from;
        for &waypoint in via.iter().chain(std::iter::once(&to)) {
            let leg = self.shortest_route(gtu_type, leg_start, waypoint, weight)?;
            nodes.extend_from_slice(&leg.nodes()[1..]);
            leg_start = waypoint;
        }
        Ok(Route::with_nodes(&id, gtu_type, nodes))
    }

    fn search(
        &self,
        graph: &RouteGraph,
        gtu_type: GtuTypeId,
        from: NodeId,
        to: NodeId,
        weight: LinkWeight,
    ) -> NetworkResult<Route> {
        let heuristic = weight.heuristic();
        let goal = self.node_ref(to)?.point();
        let estimate = |node: NodeId| -> f64 {
            match heuristic {
                Some(h) => self.node(node).map_or(0.0, |n| h(n.point(), goal)),
                None => 0.0,
            }
        };

        let slots = graph.node_out_start.len() - 1;
        // dist[v] = best known cost to reach v (the heap carries cost plus
        // the heuristic estimate).
        let mut dist = vec![f64::INFINITY; slots];
        // prev_edge[v] = edge index that reached v.
        let mut prev_edge = vec![NO_EDGE; slots];
        let mut settled = vec![false; slots];

        dist[from.index()] = 0.0;
        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
        heap.push(Reverse(HeapEntry { cost: estimate(from), node: from }));

        while let Some(Reverse(HeapEntry { cost: _, node })) = heap.pop() {
            if node == to {
                return self.reconstruct(graph, gtu_type, from, to, &prev_edge);
            }
            // Skip stale heap entries; the heuristic is consistent, so a
            // settled node is final.
            if settled[node.index()] {
                continue;
            }
            settled[node.index()] = true;
            for e in graph.out_edges(node) {
                let neighbor = graph.edge_to[e];
                let new_cost = dist[node.index()] + graph.edge_weight[e];
                if new_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = new_cost;
                    prev_edge[neighbor.index()] = e as u32;
                    heap.push(Reverse(HeapEntry {
                        cost: new_cost + estimate(neighbor),
                        node: neighbor,
                    }));
                }
            }
        }

        let from_id = self.node_id_string(from);
        let to_id = self.node_id_string(to);
        log::debug!("no route from {from_id} to {to_id} (weight {weight:?})");
        Err(NetworkError::NoRoute { from: from_id, to: to_id })
    }

    /// Walk the edge list back from `to`, then build the route front to
    /// back: at each step the next node is whichever endpoint of the edge's
    /// link is not the route's current tail and is directionally reachable
    /// from it; if neither endpoint qualifies the graph edge does not match
    /// any permitted traversal and the query fails.
    fn reconstruct(
        &self,
        graph: &RouteGraph,
        gtu_type: GtuTypeId,
        from: NodeId,
        to: NodeId,
        prev_edge: &[u32],
    ) -> NetworkResult<Route> {
        let mut links = Vec::new();
        let mut cur = to;
        while cur != from {
            let e = prev_edge[cur.index()];
            if e == NO_EDGE {
                break;
            }
            let e = e as usize;
            links.push(graph.edge_link[e]);
            cur = self
                .link_ref(graph.edge_link[e])?
                .other_node(cur)
                .ok_or_else(|| NetworkError::RoutingConsistency {
                    at: self.node_id_string(cur),
                })?;
        }
        links.reverse();

        let id = format!("{}-{}", self.node_id_string(from), self.node_id_string(to));
        let mut route = Route::new(&id, gtu_type);
        route.add_node(from);
        let mut tail = from;
        for link_id in links {
            let link = self.link_ref(link_id)?;
            let candidate = match link.other_node(tail) {
                Some(n) => n,
                None => {
                    return Err(NetworkError::RoutingConsistency {
                        at: self.node_id_string(tail),
                    });
                }
            };
            if !self.is_directionally_connected_to(gtu_type, tail, candidate) {
                return Err(NetworkError::RoutingConsistency {
                    at: self.node_id_string(tail),
                });
            }
            route.add_node(candidate);
            tail = candidate;
        }
        Ok(route)
    }
}
