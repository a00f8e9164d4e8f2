//! Routes: ordered node sequences with a single traversal pointer.
//!
//! Insertion is intentionally permissive — `add_node` performs no
//! connectivity check, so callers can edit routes speculatively.  The
//! connectivity of consecutive nodes is checked at *traversal* time by
//! [`Route::visit_next_node`], which also enforces that the pointer never
//! moves backwards.

use tn_core::{GtuTypeId, NodeId};

use crate::error::{NetworkError, NetworkResult};
use crate::network::Network;

/// An ordered, mutable sequence of nodes with a single traversal pointer.
///
/// `last_visited == None` means traversal has not started.  Routes are owned
/// by their callers; [`Network::add_route`](crate::Network::add_route)
/// registers a validated copy for lookup by other collaborators.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    id: String,
    gtu_type: GtuTypeId,
    nodes: Vec<NodeId>,
    last_visited: Option<usize>,
}

impl Route {
    pub fn new(id: &str, gtu_type: GtuTypeId) -> Self {
        Self {
            id: id.to_owned(),
            gtu_type,
            nodes: Vec::new(),
            last_visited: None,
        }
    }

    pub fn with_nodes(id: &str, gtu_type: GtuTypeId, nodes: Vec<NodeId>) -> Self {
        Self { id: id.to_owned(), gtu_type, nodes, last_visited: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn gtu_type(&self) -> GtuTypeId {
        self.gtu_type
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Index of the last visited node; `None` before traversal starts.
    pub fn last_visited(&self) -> Option<usize> {
        self.last_visited
    }

    /// The last visited node itself.
    pub fn last_visited_node(&self) -> Option<NodeId> {
        self.last_visited.map(|i| self.nodes[i])
    }

    /// Append a node.  No connectivity check; see the module docs.
    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    /// Advance the traversal pointer to the next node and return it, or
    /// `Ok(None)` when the route is exhausted (the pointer stays put).
    ///
    /// Consecutive nodes must be connected by a link registered in `network`;
    /// a missing link fails with [`NetworkError::NodesNotConnected`] and
    /// leaves the pointer unchanged.
    pub fn visit_next_node(&mut self, network: &Network) -> NetworkResult<Option<NodeId>> {
        let next = self.last_visited.map_or(0, |i| i + 1);
        if next >= self.nodes.len() {
            return Ok(None);
        }
        if next > 0 {
            let prev = self.nodes[next - 1];
            let cur = self.nodes[next];
            if !network.are_linked(prev, cur) {
                return Err(NetworkError::NodesNotConnected {
                    from: network.node_id_string(prev),
                    to: network.node_id_string(cur),
                });
            }
        }
        self.last_visited = Some(next);
        Ok(Some(self.nodes[next]))
    }

    /// Remove the node at `index`.  Fails at the traversal pointer or out of
    /// range; removals before the pointer shift it so it keeps naming the
    /// same node.
    pub fn remove_node_at(&mut self, index: usize) -> NetworkResult<NodeId> {
        if index >= self.nodes.len() || self.last_visited == Some(index) {
            return Err(NetworkError::RoutePointer { index });
        }
        if let Some(v) = self.last_visited
            && index < v
        {
            self.last_visited = Some(v - 1);
        }
        Ok(self.nodes.remove(index))
    }
}
