//! The network registry: nodes, links, routes, GTUs, and spatial queries.
//!
//! # Data layout
//!
//! Nodes and links live in **arenas** (`Vec<Option<_>>`) addressed by stable
//! `NodeId`/`LinkId` handles; removal leaves a tombstone slot, so a handle
//! never silently starts pointing at a different record.  String-id lookup
//! goes through `FxHashMap` side indices.  Adjacency is stored as handle
//! lists on the node records, not as embedded references.
//!
//! # Generations
//!
//! Every structural mutation bumps a topology `generation` counter.  Derived
//! caches (routing graphs, the R-tree, the lane caches one layer up) record
//! the generation they were built for and rebuild when it no longer matches,
//! so a stale cache is an enforced rebuild, not a documented convention.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over node positions answers nearest-node snapping
//! and k-nearest queries.  It is rebuilt lazily behind a `RefCell` when the
//! generation moves; the model is single-threaded (see the crate docs), so
//! interior mutability here is only a convenience for `&self` queries.

use std::cell::RefCell;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use tn_core::{GtuId, GtuTypeId, GtuTypes, LinkId, LinkTypeId, NodeId, Point2, Polyline, SimTime};

use crate::error::{NetworkError, NetworkResult};
use crate::link::{Link, LinkType, LongitudinalDirectionality, TravelDirection};
use crate::listener::NetworkListener;
use crate::node::{Node, NodeKind};
use crate::route::Route;
use crate::routing::RouteGraph;

// ── Spatial index entry ───────────────────────────────────────────────────────

/// Entry stored in the R-tree: a planar point with the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

struct SpatialCache {
    built_for_generation: u64,
    tree: RTree<NodeEntry>,
}

impl Default for SpatialCache {
    fn default() -> Self {
        // u64::MAX marks "never built"; the live generation starts at 0.
        Self { built_for_generation: u64::MAX, tree: RTree::new() }
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box of the network's node positions.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Relative margin added around [`Network::extent`].
const EXTENT_MARGIN: f64 = 0.05;

// ── Network ───────────────────────────────────────────────────────────────────

/// The owning registry of a typed network: nodes, links, link types, routes,
/// registered GTUs, the GTU-type registry, and the per-type routing-graph
/// cache.
///
/// Not internally thread-safe: one logical thread mutates and queries the
/// topology at any instant.
pub struct Network {
    id: String,

    nodes: Vec<Option<Node>>,
    node_index: FxHashMap<String, NodeId>,
    links: Vec<Option<Link>>,
    link_index: FxHashMap<String, LinkId>,

    link_types: Vec<LinkType>,
    link_type_index: FxHashMap<String, LinkTypeId>,
    gtu_types: GtuTypes,

    /// GTU type → route id → registered route copy.
    routes: FxHashMap<GtuTypeId, FxHashMap<String, Route>>,
    gtus: FxHashMap<GtuId, GtuTypeId>,

    /// Bumped on every structural mutation; derived caches compare against it.
    generation: u64,
    pub(crate) graphs: FxHashMap<GtuTypeId, RouteGraph>,
    spatial: RefCell<SpatialCache>,

    listeners: Vec<Box<dyn NetworkListener>>,
    sim_time: SimTime,
}

impl Network {
    /// An empty network with no registered types.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            nodes: Vec::new(),
            node_index: FxHashMap::default(),
            links: Vec::new(),
            link_index: FxHashMap::default(),
            link_types: Vec::new(),
            link_type_index: FxHashMap::default(),
            gtu_types: GtuTypes::new(),
            routes: FxHashMap::default(),
            gtus: FxHashMap::default(),
            generation: 0,
            graphs: FxHashMap::default(),
            spatial: RefCell::new(SpatialCache::default()),
            listeners: Vec::new(),
            sim_time: SimTime::ZERO,
        }
    }

    /// A network seeded with the default GTU-type hierarchy and the default
    /// link types (`NONE`, `ROAD`, `FREEWAY`, `WATERWAY`, `RAILWAY`,
    /// `CONNECTOR`).
    pub fn with_default_types(id: &str) -> Self {
        let mut net = Self::new(id);
        net.gtu_types = GtuTypes::with_defaults();
        net.seed_link_type(LinkType::new("NONE", false));
        net.seed_default_link_type("ROAD", false, "ROAD_USER");
        net.seed_default_link_type("FREEWAY", false, "VEHICLE");
        net.seed_default_link_type("WATERWAY", false, "WATERWAY_USER");
        net.seed_default_link_type("RAILWAY", false, "RAILWAY_USER");
        net.seed_default_link_type("CONNECTOR", true, "ROAD_USER");
        net
    }

    fn seed_default_link_type(&mut self, id: &str, connector: bool, user: &str) {
        let mut lt = LinkType::new(id, connector);
        if let Some(t) = self.gtu_types.get(user) {
            lt = lt.permit(t, LongitudinalDirectionality::Both);
        }
        self.seed_link_type(lt);
    }

    fn seed_link_type(&mut self, lt: LinkType) {
        let id = LinkTypeId(self.link_types.len() as u16);
        self.link_type_index.insert(lt.id().to_owned(), id);
        self.link_types.push(lt);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
    }

    /// Advance the topology generation without a mutation of this registry.
    /// Layers that attach structural data to links (lane lists, markers)
    /// call this after their own edits so every generation-checked cache
    /// rebuilds.
    pub fn invalidate_caches(&mut self) {
        self.bump_generation();
    }

    // ── Clock and listeners ───────────────────────────────────────────────

    /// Current simulated time, pushed in by the external clock; used only to
    /// timestamp events.
    pub fn sim_time(&self) -> SimTime {
        self.sim_time
    }

    pub fn set_sim_time(&mut self, time: SimTime) {
        self.sim_time = time;
    }

    pub fn add_listener(&mut self, listener: Box<dyn NetworkListener>) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, f: impl Fn(&mut dyn NetworkListener, SimTime)) {
        let time = self.sim_time;
        for l in &mut self.listeners {
            f(l.as_mut(), time);
        }
    }

    // ── Types ─────────────────────────────────────────────────────────────

    pub fn gtu_types(&self) -> &GtuTypes {
        &self.gtu_types
    }

    /// Register a GTU type; see [`GtuTypes::register`].
    pub fn register_gtu_type(
        &mut self,
        id: &str,
        parent: Option<GtuTypeId>,
    ) -> NetworkResult<GtuTypeId> {
        Ok(self.gtu_types.register(id, parent)?)
    }

    pub fn add_link_type(&mut self, link_type: LinkType) -> NetworkResult<LinkTypeId> {
        if self.link_type_index.contains_key(link_type.id()) {
            return Err(NetworkError::DuplicateId(link_type.id().to_owned()));
        }
        let id = LinkTypeId(self.link_types.len() as u16);
        self.link_type_index.insert(link_type.id().to_owned(), id);
        self.link_types.push(link_type);
        Ok(id)
    }

    pub fn link_type(&self, id: LinkTypeId) -> Option<&LinkType> {
        self.link_types.get(id.index())
    }

    pub fn get_link_type(&self, id: &str) -> Option<LinkTypeId> {
        self.link_type_index.get(id).copied()
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    pub fn add_node(
        &mut self,
        id: &str,
        point: Point2,
        heading: f64,
        kind: NodeKind,
    ) -> NetworkResult<NodeId> {
        if self.node_index.contains_key(id) {
            return Err(NetworkError::DuplicateId(id.to_owned()));
        }
        let handle = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(id.to_owned(), point, heading, kind)));
        self.node_index.insert(id.to_owned(), handle);
        self.bump_generation();
        let owned = id.to_owned();
        self.notify(|l, t| l.node_added(&owned, t));
        Ok(handle)
    }

    /// Remove a node.  Fails while any link is still incident — removal does
    /// not cascade, so dangling references surface early.
    pub fn remove_node(&mut self, id: &str) -> NetworkResult<()> {
        let handle = self
            .node_index
            .get(id)
            .copied()
            .ok_or_else(|| NetworkError::UnknownNode(id.to_owned()))?;
        let count = self.node_ref(handle)?.links().len();
        if count > 0 {
            return Err(NetworkError::NodeHasLinks { node: id.to_owned(), count });
        }
        self.nodes[handle.index()] = None;
        self.node_index.remove(id);
        self.bump_generation();
        let owned = id.to_owned();
        self.notify(|l, t| l.node_removed(&owned, t));
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_node(&self, id: &str) -> Option<NodeId> {
        self.node_index.get(id).copied()
    }

    /// Live nodes in handle order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> NetworkResult<&Node> {
        self.node(id).ok_or(NetworkError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> NetworkResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(NetworkError::InvalidNode(id))
    }

    /// The node's string id, or the handle rendering for a stale handle
    /// (display contexts only).
    pub(crate) fn node_id_string(&self, id: NodeId) -> String {
        self.node(id).map_or_else(|| id.to_string(), |n| n.id().to_owned())
    }

    // ── Links ─────────────────────────────────────────────────────────────

    /// Add a non-connector link.  Centroid endpoints are rejected; use
    /// [`Network::add_link_allowing_centroid`] to permit them explicitly.
    pub fn add_link(
        &mut self,
        id: &str,
        start: NodeId,
        end: NodeId,
        link_type: LinkTypeId,
        design_line: Polyline,
    ) -> NetworkResult<LinkId> {
        self.insert_link(id, start, end, link_type, design_line, None, false)
    }

    /// Add a non-connector link that is explicitly permitted to terminate at
    /// a centroid.
    pub fn add_link_allowing_centroid(
        &mut self,
        id: &str,
        start: NodeId,
        end: NodeId,
        link_type: LinkTypeId,
        design_line: Polyline,
    ) -> NetworkResult<LinkId> {
        self.insert_link(id, start, end, link_type, design_line, None, true)
    }

    /// Add a connector: the link type must carry the connector flag, at
    /// least one endpoint must be a centroid, and the demand weight must be
    /// non-negative.
    pub fn add_connector(
        &mut self,
        id: &str,
        start: NodeId,
        end: NodeId,
        link_type: LinkTypeId,
        design_line: Polyline,
        demand_weight: f64,
    ) -> NetworkResult<LinkId> {
        self.insert_link(id, start, end, link_type, design_line, Some(demand_weight), false)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_link(
        &mut self,
        id: &str,
        start: NodeId,
        end: NodeId,
        link_type: LinkTypeId,
        design_line: Polyline,
        demand_weight: Option<f64>,
        allow_centroid: bool,
    ) -> NetworkResult<LinkId> {
        if self.link_index.contains_key(id) {
            return Err(NetworkError::DuplicateId(id.to_owned()));
        }
        let lt = self
            .link_types
            .get(link_type.index())
            .ok_or_else(|| NetworkError::UnknownLinkType(link_type.to_string()))?;
        let start_centroid = self.node_ref(start)?.is_centroid();
        let end_centroid = self.node_ref(end)?.is_centroid();

        match demand_weight {
            Some(w) => {
                if !lt.is_connector() {
                    return Err(NetworkError::NotConnectorType(lt.id().to_owned()));
                }
                if w < 0.0 {
                    return Err(NetworkError::NegativeDemandWeight {
                        link: id.to_owned(),
                        weight: w,
                    });
                }
                if !start_centroid && !end_centroid {
                    return Err(NetworkError::ConnectorWithoutCentroid(id.to_owned()));
                }
            }
            None => {
                if lt.is_connector() {
                    return Err(NetworkError::ConnectorType(lt.id().to_owned()));
                }
                if !allow_centroid {
                    let centroid =
                        if start_centroid { Some(start) } else if end_centroid { Some(end) } else { None };
                    if let Some(node) = centroid {
                        return Err(NetworkError::CentroidEndpoint {
                            link: id.to_owned(),
                            node: self.node_id_string(node),
                        });
                    }
                }
            }
        }

        let handle = LinkId(self.links.len() as u32);
        self.links.push(Some(Link::new(
            id.to_owned(),
            start,
            end,
            link_type,
            design_line,
            demand_weight,
        )));
        self.link_index.insert(id.to_owned(), handle);
        self.node_mut(start)?.attach_link(handle);
        if end != start {
            self.node_mut(end)?.attach_link(handle);
        }
        self.bump_generation();
        let owned = id.to_owned();
        self.notify(|l, t| l.link_added(&owned, t));
        Ok(handle)
    }

    pub fn remove_link(&mut self, id: &str) -> NetworkResult<()> {
        let handle = self
            .link_index
            .get(id)
            .copied()
            .ok_or_else(|| NetworkError::UnknownLink(id.to_owned()))?;
        let (start, end) = {
            let link = self.link_ref(handle)?;
            (link.start(), link.end())
        };
        self.node_mut(start)?.detach_link(handle);
        if end != start {
            self.node_mut(end)?.detach_link(handle);
        }
        self.links[handle.index()] = None;
        self.link_index.remove(id);
        self.bump_generation();
        let owned = id.to_owned();
        self.notify(|l, t| l.link_removed(&owned, t));
        Ok(())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_link(&self, id: &str) -> Option<LinkId> {
        self.link_index.get(id).copied()
    }

    /// Live links in registration order (handles are never reused, so arena
    /// order is registration order).
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|l| (LinkId(i as u32), l)))
    }

    pub fn link_count(&self) -> usize {
        self.link_index.len()
    }

    pub(crate) fn link_ref(&self, id: LinkId) -> NetworkResult<&Link> {
        self.link(id).ok_or(NetworkError::InvalidLink(id))
    }

    /// First registered link running from `a` to `b` (design direction), by
    /// linear scan in registration order.
    pub fn get_link_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.links()
            .find(|(_, l)| l.start() == a && l.end() == b)
            .map(|(id, _)| id)
    }

    /// `true` if some registered link joins `a` and `b` in either
    /// orientation.
    pub fn are_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.links().any(|(_, l)| l.connects(a, b))
    }

    // ── Per-type connectivity ─────────────────────────────────────────────

    /// Directionality of a link for a GTU type (parent-chain fallback on the
    /// link type's map).
    pub fn link_directionality(
        &self,
        gtu_type: GtuTypeId,
        link: &Link,
    ) -> LongitudinalDirectionality {
        self.link_type(link.link_type())
            .map_or(LongitudinalDirectionality::None, |lt| {
                lt.directionality(&self.gtu_types, gtu_type)
            })
    }

    /// `true` if a vehicle of `gtu_type` may *arrive* at `node` via `link`.
    fn permits_arrival(&self, gtu_type: GtuTypeId, link: &Link, node: NodeId) -> bool {
        let dir = self.link_directionality(gtu_type, link);
        (link.end() == node && dir.permits(TravelDirection::Forward))
            || (link.start() == node && dir.permits(TravelDirection::Backward))
    }

    /// `true` if a vehicle of `gtu_type` may *depart* from `node` via `link`.
    fn permits_departure(&self, gtu_type: GtuTypeId, link: &Link, node: NodeId) -> bool {
        let dir = self.link_directionality(gtu_type, link);
        (link.start() == node && dir.permits(TravelDirection::Forward))
            || (link.end() == node && dir.permits(TravelDirection::Backward))
    }

    /// Record an explicit connectivity override at `node`: a vehicle of
    /// `gtu_type` arriving via `incoming` may continue onto `outgoing`.
    ///
    /// Once any connection is recorded for a type at a node, the override
    /// *replaces* structural derivation there entirely (including the
    /// default U-turn exclusion).
    pub fn add_connection(
        &mut self,
        gtu_type: GtuTypeId,
        node: NodeId,
        incoming: LinkId,
        outgoing: LinkId,
    ) -> NetworkResult<()> {
        let node_str = self.node_id_string(node);
        let in_link = self.link_ref(incoming)?;
        if in_link.other_node(node).is_none() {
            return Err(NetworkError::NotIncident {
                link: in_link.id().to_owned(),
                node: node_str,
            });
        }
        if !self.permits_arrival(gtu_type, in_link, node) {
            return Err(NetworkError::NotConnectable {
                link: in_link.id().to_owned(),
                node: node_str,
            });
        }
        let out_link = self.link_ref(outgoing)?;
        if out_link.other_node(node).is_none() {
            return Err(NetworkError::NotIncident {
                link: out_link.id().to_owned(),
                node: node_str,
            });
        }
        if !self.permits_departure(gtu_type, out_link, node) {
            return Err(NetworkError::NotConnectable {
                link: out_link.id().to_owned(),
                node: node_str,
            });
        }
        self.node_mut(node)?.add_connection(gtu_type, incoming, outgoing);
        Ok(())
    }

    /// The links a vehicle of `gtu_type` may continue onto at `node`, having
    /// arrived via `incoming`.
    ///
    /// With an explicit override for the type the result is exactly the
    /// overridden set (possibly empty).  Otherwise it is derived
    /// structurally: every incident link permitting departure, excluding
    /// `incoming` itself (no U-turn by default).
    pub fn next_links(
        &self,
        gtu_type: GtuTypeId,
        node: NodeId,
        incoming: LinkId,
    ) -> NetworkResult<Vec<LinkId>> {
        let n = self.node_ref(node)?;
        let in_link = self.link_ref(incoming)?;
        if in_link.other_node(node).is_none() {
            return Err(NetworkError::NotIncident {
                link: in_link.id().to_owned(),
                node: n.id().to_owned(),
            });
        }
        if !self.permits_arrival(gtu_type, in_link, node) {
            return Err(NetworkError::NotConnectable {
                link: in_link.id().to_owned(),
                node: n.id().to_owned(),
            });
        }
        if let Some(set) = n.connections_for(gtu_type, incoming) {
            return Ok(set.to_vec());
        }
        Ok(n.links()
            .iter()
            .copied()
            .filter(|&l| l != incoming)
            .filter(|&l| {
                self.link(l)
                    .is_some_and(|link| self.permits_departure(gtu_type, link, node))
            })
            .collect())
    }

    /// `true` if some incident link permits travel from `from` to `to` for
    /// the type.
    ///
    /// Known limitation: this check has no incoming-link context, so it
    /// cannot detect situations reachable only by U-turn.
    pub fn is_directionally_connected_to(
        &self,
        gtu_type: GtuTypeId,
        from: NodeId,
        to: NodeId,
    ) -> bool {
        let Some(n) = self.node(from) else {
            return false;
        };
        n.links().iter().any(|&l| {
            self.link(l).is_some_and(|link| {
                link.other_node(from) == Some(to) && self.permits_departure(gtu_type, link, from)
            })
        })
    }

    // ── Routes ────────────────────────────────────────────────────────────

    /// Register a validated copy of a route.  Every node must be registered;
    /// a duplicate (type, id) pair is rejected.
    pub fn add_route(&mut self, route: Route) -> NetworkResult<()> {
        for &node in route.nodes() {
            self.node_ref(node)?;
        }
        let per_type = self.routes.entry(route.gtu_type()).or_default();
        if per_type.contains_key(route.id()) {
            return Err(NetworkError::DuplicateId(route.id().to_owned()));
        }
        let gtu_type = route.gtu_type();
        let id = route.id().to_owned();
        per_type.insert(id.clone(), route);
        self.notify(|l, t| l.route_added(gtu_type, &id, t));
        Ok(())
    }

    pub fn remove_route(&mut self, gtu_type: GtuTypeId, id: &str) -> NetworkResult<Route> {
        let route = self
            .routes
            .get_mut(&gtu_type)
            .and_then(|m| m.remove(id))
            .ok_or_else(|| NetworkError::UnknownRoute(id.to_owned()))?;
        let owned = id.to_owned();
        self.notify(|l, t| l.route_removed(gtu_type, &owned, t));
        Ok(route)
    }

    pub fn route(&self, gtu_type: GtuTypeId, id: &str) -> Option<&Route> {
        self.routes.get(&gtu_type).and_then(|m| m.get(id))
    }

    pub fn routes(&self, gtu_type: GtuTypeId) -> impl Iterator<Item = &Route> {
        self.routes.get(&gtu_type).into_iter().flat_map(|m| m.values())
    }

    // ── GTUs ──────────────────────────────────────────────────────────────

    pub fn add_gtu(&mut self, id: GtuId, gtu_type: GtuTypeId) -> NetworkResult<()> {
        if self.gtus.contains_key(&id) {
            return Err(NetworkError::DuplicateGtu(id));
        }
        self.gtus.insert(id, gtu_type);
        self.notify(|l, t| l.gtu_added(id, t));
        Ok(())
    }

    pub fn remove_gtu(&mut self, id: GtuId) -> NetworkResult<GtuTypeId> {
        let gtu_type = self.gtus.remove(&id).ok_or(NetworkError::UnknownGtu(id))?;
        self.notify(|l, t| l.gtu_removed(id, t));
        Ok(gtu_type)
    }

    pub fn gtu_type_of(&self, id: GtuId) -> Option<GtuTypeId> {
        self.gtus.get(&id).copied()
    }

    pub fn gtu_count(&self) -> usize {
        self.gtus.len()
    }

    /// Destruction semantics: force-remove all GTUs (events fired), then
    /// drop all routes, links, and nodes.
    pub fn clear(&mut self) {
        let gtu_ids: Vec<GtuId> = self.gtus.keys().copied().collect();
        for id in gtu_ids {
            self.gtus.remove(&id);
            self.notify(|l, t| l.gtu_removed(id, t));
        }
        self.routes.clear();
        self.links.clear();
        self.link_index.clear();
        self.nodes.clear();
        self.node_index.clear();
        self.graphs.clear();
        self.bump_generation();
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    fn with_spatial<R>(&self, f: impl FnOnce(&RTree<NodeEntry>) -> R) -> R {
        let mut cache = self.spatial.borrow_mut();
        if cache.built_for_generation != self.generation {
            let entries: Vec<NodeEntry> = self
                .nodes()
                .map(|(id, n)| NodeEntry { point: [n.point().x, n.point().y], id })
                .collect();
            cache.tree = RTree::bulk_load(entries);
            cache.built_for_generation = self.generation;
        }
        f(&cache.tree)
    }

    /// The nearest registered node to `point`, or `None` for an empty
    /// network.
    pub fn snap_to_node(&self, point: Point2) -> Option<NodeId> {
        self.with_spatial(|tree| tree.nearest_neighbor(&[point.x, point.y]).map(|e| e.id))
    }

    /// Up to `k` nearest nodes to `point`, by ascending distance.
    pub fn k_nearest_nodes(&self, point: Point2, k: usize) -> Vec<NodeId> {
        self.with_spatial(|tree| {
            tree.nearest_neighbor_iter(&[point.x, point.y])
                .take(k)
                .map(|e| e.id)
                .collect()
        })
    }

    /// Bounding box over all node positions with a 5 % relative margin; a
    /// fixed 1000 × 1000 box around the origin when the network is empty.
    pub fn extent(&self) -> Bounds {
        let mut it = self.nodes();
        let Some((_, first)) = it.next() else {
            return Bounds {
                min: Point2::new(-500.0, -500.0),
                max: Point2::new(500.0, 500.0),
            };
        };
        let mut min = first.point();
        let mut max = first.point();
        for (_, n) in it {
            let p = n.point();
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        let mx = (max.x - min.x) * EXTENT_MARGIN;
        let my = (max.y - min.y) * EXTENT_MARGIN;
        Bounds {
            min: Point2::new(min.x - mx, min.y - my),
            max: Point2::new(max.x + mx, max.y + my),
        }
    }
}
