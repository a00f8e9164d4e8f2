//! The road network: cross-section links, elements, and lane-level queries.
//!
//! # Layering
//!
//! `RoadNetwork` wraps a [`Network`] (composition, not inheritance): the
//! inner registry owns topology, routing, and events, while this layer owns
//! the per-link cross sections and a global element arena.  Structural
//! element edits advance the inner topology generation, so every
//! generation-checked cache — here and below — rebuilds on the next query.
//!
//! # Caches
//!
//! Lateral neighbor sets and longitudinal next/prev lane maps are computed
//! lazily per (lane, GTU type) and cached behind a `RefCell` (the model is
//! single-threaded; interior mutability only serves `&self` queries).  A
//! cache built for an older generation is discarded wholesale.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};

use tn_core::{ElementId, GtuId, GtuTypeId, LinkId, LinkTypeId, NodeId, Polyline, SimTime};
use tn_network::{LongitudinalDirectionality, Network, TravelDirection};

use crate::element::{CrossSectionGeometry, Element, ElementKind, LateralDirectionality};
use crate::error::{RoadError, RoadResult};
use crate::lane::{LaneData, Sensor};
use crate::slice::{CrossSectionSlice, SliceProfile};
use crate::stripe::StripeData;

/// Lateral edges closer than this count as adjacent, evaluated independently
/// at the begin and the end of the link.
pub const ADJACENT_MARGIN: f64 = 0.2;

/// Center-line endpoints closer than this pair up as longitudinal
/// continuations across a node.
pub const ENDPOINT_MARGIN: f64 = 0.5;

// ── Cross sections and listeners ──────────────────────────────────────────────

/// Lane-keeping policy of a cross-section link.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaneKeepPolicy {
    #[default]
    KeepRight,
    KeepLeft,
    KeepLane,
}

/// The ordered element list of one cross-section link.
#[derive(Clone, Debug)]
pub struct CrossSection {
    policy: LaneKeepPolicy,
    elements: Vec<ElementId>,
    /// GTUs currently on any lane of this link.
    gtus: FxHashSet<GtuId>,
}

impl CrossSection {
    fn new(policy: LaneKeepPolicy) -> Self {
        Self { policy, elements: Vec::new(), gtus: FxHashSet::default() }
    }

    pub fn policy(&self) -> LaneKeepPolicy {
        self.policy
    }

    /// Elements in cross-section order.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Number of distinct GTUs on the link's lanes.
    pub fn gtu_count(&self) -> usize {
        self.gtus.len()
    }
}

/// Observer of road-layer mutations; all methods default to no-ops.
pub trait RoadListener {
    /// A lane was appended to a link; `index` is its position among the
    /// link's lanes.
    fn lane_added(&mut self, _link: &str, _lane: &str, _index: usize, _time: SimTime) {}

    /// A lane was removed from a link.
    fn lane_removed(&mut self, _link: &str, _lane: &str, _time: SimTime) {}

    /// A GTU entered a lane; `count` is the resulting occupancy.
    fn gtu_entered_lane(&mut self, _gtu: GtuId, _lane: &str, _count: usize, _time: SimTime) {}

    /// A GTU left a lane; `count` is the resulting occupancy.
    fn gtu_left_lane(&mut self, _gtu: GtuId, _lane: &str, _count: usize, _time: SimTime) {}

    /// A GTU entered the first of a link's lanes it occupies; `count` is the
    /// number of distinct GTUs now on the link.
    fn gtu_entered_link(&mut self, _gtu: GtuId, _link: &str, _count: usize, _time: SimTime) {}

    /// A GTU left the last of a link's lanes it occupied; `count` is the
    /// number of distinct GTUs still on the link.
    fn gtu_left_link(&mut self, _gtu: GtuId, _link: &str, _count: usize, _time: SimTime) {}
}

#[derive(Default)]
struct LaneCaches {
    built_for_generation: u64,
    neighbors: FxHashMap<(ElementId, GtuTypeId, LateralDirectionality), Vec<ElementId>>,
    next: FxHashMap<(ElementId, GtuTypeId), Vec<(ElementId, TravelDirection)>>,
    prev: FxHashMap<(ElementId, GtuTypeId), Vec<(ElementId, TravelDirection)>>,
}

impl LaneCaches {
    fn reset(&mut self, generation: u64) {
        self.neighbors.clear();
        self.next.clear();
        self.prev.clear();
        self.built_for_generation = generation;
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// A [`Network`] extended with per-link cross sections and lane queries.
pub struct RoadNetwork {
    network: Network,
    cross_sections: FxHashMap<LinkId, CrossSection>,
    elements: Vec<Option<Element>>,
    element_index: FxHashMap<(LinkId, String), ElementId>,
    caches: RefCell<LaneCaches>,
    listeners: Vec<Box<dyn RoadListener>>,
}

impl RoadNetwork {
    pub fn new(id: &str) -> Self {
        Self::wrap(Network::new(id))
    }

    /// Seeded with the default GTU-type hierarchy and link types; see
    /// [`Network::with_default_types`].
    pub fn with_default_types(id: &str) -> Self {
        Self::wrap(Network::with_default_types(id))
    }

    fn wrap(network: Network) -> Self {
        Self {
            network,
            cross_sections: FxHashMap::default(),
            elements: Vec::new(),
            element_index: FxHashMap::default(),
            caches: RefCell::new(LaneCaches::default()),
            listeners: Vec::new(),
        }
    }

    /// The wrapped topology registry.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access to the wrapped registry.  Structural edits made here
    /// advance the generation, so the lane caches rebuild on the next query.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn add_listener(&mut self, listener: Box<dyn RoadListener>) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, f: impl Fn(&mut dyn RoadListener, SimTime)) {
        let time = self.network.sim_time();
        for l in &mut self.listeners {
            f(l.as_mut(), time);
        }
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Register a link and open an (initially empty) cross section on it.
    pub fn add_cross_section_link(
        &mut self,
        id: &str,
        start: NodeId,
        end: NodeId,
        link_type: LinkTypeId,
        design_line: Polyline,
        policy: LaneKeepPolicy,
    ) -> RoadResult<LinkId> {
        let link = self.network.add_link(id, start, end, link_type, design_line)?;
        self.cross_sections.insert(link, CrossSection::new(policy));
        Ok(link)
    }

    pub fn cross_section(&self, link: LinkId) -> Option<&CrossSection> {
        self.cross_sections.get(&link)
    }

    /// Append a lane.  The lane's directionality entries must stay within
    /// what the parent link type permits; violations are construction-time
    /// errors.
    pub fn add_lane(
        &mut self,
        link: LinkId,
        id: &str,
        slices: Vec<CrossSectionSlice>,
        lane: LaneData,
    ) -> RoadResult<ElementId> {
        self.check_lane_directionality(link, id, &lane)?;
        let handle = self.insert_element(link, id, slices, ElementKind::Lane(lane))?;
        let index = self.lane_index_on_link(link, handle);
        let link_id = self.link_str(link);
        let lane_id = id.to_owned();
        self.notify(|l, t| l.lane_added(&link_id, &lane_id, index, t));
        Ok(handle)
    }

    pub fn add_shoulder(
        &mut self,
        link: LinkId,
        id: &str,
        slices: Vec<CrossSectionSlice>,
    ) -> RoadResult<ElementId> {
        self.insert_element(link, id, slices, ElementKind::Shoulder)
    }

    pub fn add_stripe(
        &mut self,
        link: LinkId,
        id: &str,
        slices: Vec<CrossSectionSlice>,
        stripe: StripeData,
    ) -> RoadResult<ElementId> {
        self.insert_element(link, id, slices, ElementKind::Stripe(stripe))
    }

    /// Remove an element from its link's cross section.  The arena slot
    /// becomes a tombstone, so other handles stay valid; the generation
    /// advances and removing a lane fires [`RoadListener::lane_removed`].
    /// Occupants of a removed lane are discarded without occupancy events.
    pub fn remove_element(&mut self, element: ElementId) -> RoadResult<()> {
        let (link, id, was_lane) = {
            let el = self.element_ref(element)?;
            (el.link(), el.id().to_owned(), el.is_lane())
        };
        self.element_index.remove(&(link, id.clone()));
        self.elements[element.index()] = None;
        if let Some(cs) = self.cross_sections.get_mut(&link) {
            cs.elements.retain(|&e| e != element);
        }
        if was_lane {
            // Link occupancy keeps only GTUs still on a surviving lane.
            let survivors: FxHashSet<GtuId> = self
                .lanes(link)
                .filter_map(|e| self.element(e).and_then(Element::as_lane))
                .flat_map(|l| l.gtus().iter().map(|&(g, _)| g))
                .collect();
            if let Some(cs) = self.cross_sections.get_mut(&link) {
                cs.gtus.retain(|g| survivors.contains(g));
            }
        }
        self.network.invalidate_caches();
        if was_lane {
            let link_str = self.link_str(link);
            self.notify(|l, t| l.lane_removed(&link_str, &id, t));
        }
        Ok(())
    }

    fn check_lane_directionality(&self, link: LinkId, id: &str, lane: &LaneData) -> RoadResult<()> {
        let l = self.network.link(link).ok_or(tn_network::NetworkError::InvalidLink(link))?;
        for (gtu_type, lane_dir) in lane.directionality_entries() {
            let link_dir = self.network.link_directionality(gtu_type, l);
            if !covers(link_dir, lane_dir) {
                return Err(RoadError::DirectionalityConflict {
                    element: id.to_owned(),
                    link: l.id().to_owned(),
                });
            }
        }
        Ok(())
    }

    fn insert_element(
        &mut self,
        link: LinkId,
        id: &str,
        slices: Vec<CrossSectionSlice>,
        kind: ElementKind,
    ) -> RoadResult<ElementId> {
        let l = self.network.link(link).ok_or(tn_network::NetworkError::InvalidLink(link))?;
        let link_str = l.id().to_owned();
        if !self.cross_sections.contains_key(&link) {
            return Err(RoadError::NotACrossSectionLink(link_str));
        }
        let key = (link, id.to_owned());
        if self.element_index.contains_key(&key) {
            return Err(RoadError::DuplicateElement { link: link_str, element: id.to_owned() });
        }
        let profile = SliceProfile::new(id, slices, l.length())?;
        let geometry = CrossSectionGeometry::derive(l.design_line(), profile)?;

        let handle = ElementId(self.elements.len() as u32);
        self.elements.push(Some(Element::new(id.to_owned(), link, geometry, kind)));
        self.element_index.insert(key, handle);
        if let Some(cs) = self.cross_sections.get_mut(&link) {
            cs.elements.push(handle);
        }
        self.network.invalidate_caches();
        Ok(handle)
    }

    fn lane_index_on_link(&self, link: LinkId, element: ElementId) -> usize {
        self.lanes(link).take_while(|&e| e != element).count()
    }

    // ── Element access ────────────────────────────────────────────────────

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_element(&self, link: LinkId, id: &str) -> Option<ElementId> {
        self.element_index.get(&(link, id.to_owned())).copied()
    }

    fn element_ref(&self, id: ElementId) -> RoadResult<&Element> {
        self.element(id).ok_or(RoadError::InvalidElement(id))
    }

    fn lane_ref(&self, id: ElementId) -> RoadResult<(&Element, &LaneData)> {
        let el = self.element_ref(id)?;
        let lane = el.as_lane().ok_or(RoadError::NotALane(id))?;
        Ok((el, lane))
    }

    /// The lanes of a link in cross-section order.
    pub fn lanes(&self, link: LinkId) -> impl Iterator<Item = ElementId> + '_ {
        self.cross_sections
            .get(&link)
            .into_iter()
            .flat_map(|cs| cs.elements.iter().copied())
            .filter(|&e| self.element(e).is_some_and(Element::is_lane))
    }

    /// Width of an element at a fraction of its length.
    pub fn width_at(&self, element: ElementId, fraction: f64) -> RoadResult<f64> {
        Ok(self.element_ref(element)?.geometry().width_at(fraction))
    }

    /// Lateral center offset of an element from the link design line.
    pub fn lateral_center_at(&self, element: ElementId, fraction: f64) -> RoadResult<f64> {
        Ok(self.element_ref(element)?.geometry().offset_at(fraction))
    }

    /// Lateral offset of an element's edge on the given side.
    pub fn lateral_boundary_at(
        &self,
        element: ElementId,
        side: LateralDirectionality,
        fraction: f64,
    ) -> RoadResult<f64> {
        Ok(self.element_ref(element)?.geometry().boundary_at(side, fraction))
    }

    /// Lateral extent `(min, max)` across a link's lanes at its start.
    pub fn start_transverse_extent(&self, link: LinkId) -> Option<(f64, f64)> {
        self.transverse_extent(link, 0.0)
    }

    /// Lateral extent `(min, max)` across a link's lanes at its end.
    pub fn end_transverse_extent(&self, link: LinkId) -> Option<(f64, f64)> {
        self.transverse_extent(link, 1.0)
    }

    fn transverse_extent(&self, link: LinkId, fraction: f64) -> Option<(f64, f64)> {
        let mut extent: Option<(f64, f64)> = None;
        for lane in self.lanes(link) {
            let Some(el) = self.element(lane) else { continue };
            let lo = el.geometry().boundary_at(LateralDirectionality::Right, fraction);
            let hi = el.geometry().boundary_at(LateralDirectionality::Left, fraction);
            extent = Some(match extent {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        extent
    }

    // ── Lateral adjacency ─────────────────────────────────────────────────

    /// The lanes a vehicle of `gtu_type` on `lane` can reach by moving one
    /// lane towards `direction`, where LEFT/RIGHT are relative to the
    /// vehicle's actual travel direction on the lane.
    ///
    /// A candidate qualifies when it is geometrically adjacent at both the
    /// begin and the end of the link (within [`ADJACENT_MARGIN`]), no stripe
    /// on the shared edge forbids the crossing (no stripe at all is
    /// permeable), and its directionality permits travel in the vehicle's
    /// actual direction.  Results are cached per (lane, type, direction).
    pub fn accessible_adjacent_lanes(
        &self,
        lane: ElementId,
        direction: LateralDirectionality,
        gtu_type: GtuTypeId,
    ) -> RoadResult<Vec<ElementId>> {
        let key = (lane, gtu_type, direction);
        {
            let mut caches = self.caches.borrow_mut();
            self.refresh(&mut caches);
            if let Some(hit) = caches.neighbors.get(&key) {
                return Ok(hit.clone());
            }
        }
        let result = self.compute_adjacent(lane, direction, gtu_type)?;
        self.caches.borrow_mut().neighbors.insert(key, result.clone());
        Ok(result)
    }

    fn refresh(&self, caches: &mut LaneCaches) {
        let generation = self.network.generation();
        if caches.built_for_generation != generation {
            log::trace!("rebuilding lane caches for generation {generation}");
            caches.reset(generation);
        }
    }

    fn compute_adjacent(
        &self,
        lane: ElementId,
        direction: LateralDirectionality,
        gtu_type: GtuTypeId,
    ) -> RoadResult<Vec<ElementId>> {
        let (el, data) = self.lane_ref(lane)?;
        let types = self.network.gtu_types();
        let own_dir = data.directionality(types, gtu_type);
        if own_dir.is_none() {
            return Ok(Vec::new());
        }
        // LEFT/RIGHT are travel-relative; map to the design frame once and
        // work there.
        let backward = own_dir == LongitudinalDirectionality::Backward;
        let travel = if backward { TravelDirection::Backward } else { TravelDirection::Forward };
        let design_dir = if backward { direction.flip() } else { direction };

        let edge_begin = el.geometry().boundary_at(design_dir, 0.0);
        let edge_end = el.geometry().boundary_at(design_dir, 1.0);
        let far_side = design_dir.flip();

        let Some(cs) = self.cross_sections.get(&el.link()) else {
            return Ok(Vec::new());
        };
        let mut result = Vec::new();
        for &cand_id in &cs.elements {
            if cand_id == lane {
                continue;
            }
            let Some(cand) = self.element(cand_id) else { continue };
            let Some(cand_data) = cand.as_lane() else { continue };
            // The candidate must admit travel in the vehicle's current
            // direction.
            if !cand_data.directionality(types, gtu_type).permits(travel) {
                continue;
            }
            let cand_begin = cand.geometry().boundary_at(far_side, 0.0);
            let cand_end = cand.geometry().boundary_at(far_side, 1.0);
            if (edge_begin - cand_begin).abs() >= ADJACENT_MARGIN
                || (edge_end - cand_end).abs() >= ADJACENT_MARGIN
            {
                continue;
            }
            if self.blocked_by_stripe(cs, gtu_type, design_dir, edge_begin, edge_end) {
                continue;
            }
            result.push(cand_id);
        }
        Ok(result)
    }

    /// `true` if a stripe sits on the shared edge and forbids crossing
    /// towards `design_dir`.
    fn blocked_by_stripe(
        &self,
        cs: &CrossSection,
        gtu_type: GtuTypeId,
        design_dir: LateralDirectionality,
        edge_begin: f64,
        edge_end: f64,
    ) -> bool {
        let types = self.network.gtu_types();
        cs.elements.iter().any(|&id| {
            let Some(el) = self.element(id) else { return false };
            let Some(stripe) = el.as_stripe() else { return false };
            let on_edge = (el.geometry().offset_at(0.0) - edge_begin).abs() < ADJACENT_MARGIN
                && (el.geometry().offset_at(1.0) - edge_end).abs() < ADJACENT_MARGIN;
            on_edge && !stripe.is_permeable(types, gtu_type, design_dir)
        })
    }

    // ── Longitudinal linkage ──────────────────────────────────────────────

    /// Continuation lanes past this lane's downstream node for `gtu_type`.
    /// An empty result is a dead end for the type, not an error.
    pub fn next_lanes(
        &self,
        lane: ElementId,
        gtu_type: GtuTypeId,
    ) -> RoadResult<Vec<(ElementId, TravelDirection)>> {
        self.longitudinal(lane, gtu_type, true)
    }

    /// Lanes feeding into this lane across its upstream node for `gtu_type`.
    pub fn prev_lanes(
        &self,
        lane: ElementId,
        gtu_type: GtuTypeId,
    ) -> RoadResult<Vec<(ElementId, TravelDirection)>> {
        self.longitudinal(lane, gtu_type, false)
    }

    fn longitudinal(
        &self,
        lane: ElementId,
        gtu_type: GtuTypeId,
        downstream: bool,
    ) -> RoadResult<Vec<(ElementId, TravelDirection)>> {
        let key = (lane, gtu_type);
        {
            let mut caches = self.caches.borrow_mut();
            self.refresh(&mut caches);
            let map = if downstream { &caches.next } else { &caches.prev };
            if let Some(hit) = map.get(&key) {
                return Ok(hit.clone());
            }
        }
        let result = self.compute_longitudinal(lane, gtu_type, downstream)?;
        let mut caches = self.caches.borrow_mut();
        let map = if downstream { &mut caches.next } else { &mut caches.prev };
        map.insert(key, result.clone());
        Ok(result)
    }

    fn compute_longitudinal(
        &self,
        lane: ElementId,
        gtu_type: GtuTypeId,
        downstream: bool,
    ) -> RoadResult<Vec<(ElementId, TravelDirection)>> {
        let (el, data) = self.lane_ref(lane)?;
        let types = self.network.gtu_types();
        let own_dir = data.directionality(types, gtu_type);
        if own_dir.is_none() {
            return Ok(Vec::new());
        }
        let forward = own_dir != LongitudinalDirectionality::Backward;
        let link = self
            .network
            .link(el.link())
            .ok_or(tn_network::NetworkError::InvalidLink(el.link()))?;

        // Leaving endpoint: with the design line when traveling forward and
        // looking downstream, or in the two mirrored cases.
        let at_design_end = forward == downstream;
        let own_point = if at_design_end {
            el.geometry().center_line().last()
        } else {
            el.geometry().center_line().first()
        };
        let node = if at_design_end { link.end() } else { link.start() };

        let Some(node_rec) = self.network.node(node) else {
            return Ok(Vec::new());
        };
        let mut result = Vec::new();
        for &other_link in node_rec.links() {
            if other_link == el.link() || !self.cross_sections.contains_key(&other_link) {
                continue;
            }
            for cand_id in self.lanes(other_link) {
                let Some(cand) = self.element(cand_id) else { continue };
                let Some(cand_data) = cand.as_lane() else { continue };
                let cand_dir = cand_data.directionality(types, gtu_type);
                if cand_dir.is_none() {
                    continue;
                }
                // Both endpoint pairings are possible; keep the closer one
                // when it is within margin.
                let d_first = own_point.distance(cand.geometry().center_line().first());
                let d_last = own_point.distance(cand.geometry().center_line().last());
                if d_first.min(d_last) >= ENDPOINT_MARGIN {
                    continue;
                }
                let direction = if cand_dir == LongitudinalDirectionality::Backward {
                    TravelDirection::Backward
                } else {
                    TravelDirection::Forward
                };
                result.push((cand_id, direction));
            }
        }
        Ok(result)
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Put a GTU on a lane at a longitudinal fraction; returns the
    /// resulting occupancy count.  The occupant list stays ordered by
    /// fraction.  Entering the first lane of a link the GTU occupies also
    /// fires the link-level event.
    pub fn enter_lane(&mut self, gtu: GtuId, lane: ElementId, fraction: f64) -> RoadResult<usize> {
        let (lane_str, link) = {
            let (el, _) = self.lane_ref(lane)?;
            (el.id().to_owned(), el.link())
        };
        let count = self
            .elements
            .get_mut(lane.index())
            .and_then(Option::as_mut)
            .and_then(Element::as_lane_mut)
            .map(|l| l.insert_gtu(gtu, fraction))
            .ok_or(RoadError::NotALane(lane))?;
        let link_count = self
            .cross_sections
            .get_mut(&link)
            .and_then(|cs| cs.gtus.insert(gtu).then(|| cs.gtus.len()));
        self.notify(|l, t| l.gtu_entered_lane(gtu, &lane_str, count, t));
        if let Some(link_count) = link_count {
            let link_str = self.link_str(link);
            self.notify(|l, t| l.gtu_entered_link(gtu, &link_str, link_count, t));
        }
        Ok(count)
    }

    /// Take a GTU off a lane; returns the resulting occupancy count.
    /// Leaving the last lane the GTU occupied on the link also fires the
    /// link-level event, so a lane change within one link stays silent at
    /// the link level.
    pub fn leave_lane(&mut self, gtu: GtuId, lane: ElementId) -> RoadResult<usize> {
        let (lane_str, link) = {
            let (el, _) = self.lane_ref(lane)?;
            (el.id().to_owned(), el.link())
        };
        let count = self
            .elements
            .get_mut(lane.index())
            .and_then(Option::as_mut)
            .and_then(Element::as_lane_mut)
            .and_then(|l| l.remove_gtu(gtu))
            .ok_or_else(|| RoadError::GtuNotOnLane(lane_str.clone()))?;
        let link_count = if self.on_some_lane_of(link, gtu) {
            None
        } else {
            self.cross_sections
                .get_mut(&link)
                .and_then(|cs| cs.gtus.remove(&gtu).then(|| cs.gtus.len()))
        };
        self.notify(|l, t| l.gtu_left_lane(gtu, &lane_str, count, t));
        if let Some(link_count) = link_count {
            let link_str = self.link_str(link);
            self.notify(|l, t| l.gtu_left_link(gtu, &link_str, link_count, t));
        }
        Ok(count)
    }

    fn on_some_lane_of(&self, link: LinkId, gtu: GtuId) -> bool {
        self.lanes(link).any(|e| {
            self.element(e)
                .and_then(Element::as_lane)
                .is_some_and(|l| l.gtus().iter().any(|&(g, _)| g == gtu))
        })
    }

    fn link_str(&self, link: LinkId) -> String {
        self.network
            .link(link)
            .map_or_else(String::new, |l| l.id().to_owned())
    }

    // ── Sensors ───────────────────────────────────────────────────────────

    /// Attach a sensor to a lane; its position must lie within the lane
    /// length.  Sensors stay ordered by position.
    pub fn add_sensor(&mut self, lane: ElementId, sensor: Sensor) -> RoadResult<()> {
        let length = {
            let (el, _) = self.lane_ref(lane)?;
            el.geometry().length()
        };
        self.elements
            .get_mut(lane.index())
            .and_then(Option::as_mut)
            .and_then(Element::as_lane_mut)
            .ok_or(RoadError::NotALane(lane))?
            .add_sensor(sensor, length)
    }

    /// Sensors on a lane with positions in `[from, to]` responding to
    /// `gtu_type`, in position order.
    pub fn sensors_between(
        &self,
        lane: ElementId,
        from: f64,
        to: f64,
        gtu_type: GtuTypeId,
    ) -> RoadResult<Vec<Sensor>> {
        let (_, data) = self.lane_ref(lane)?;
        Ok(data
            .sensors_between(self.network.gtu_types(), from, to, gtu_type)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// `true` if the link-level directionality admits the lane-level one.
fn covers(link: LongitudinalDirectionality, lane: LongitudinalDirectionality) -> bool {
    use LongitudinalDirectionality as D;
    match link {
        D::Both => true,
        D::Forward => matches!(lane, D::Forward | D::None),
        D::Backward => matches!(lane, D::Backward | D::None),
        D::None => lane == D::None,
    }
}
