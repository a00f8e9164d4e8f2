//! Unit tests for the lane-level road model.

#[cfg(test)]
mod fixtures {
    use tn_core::{ElementId, GtuTypeId, LinkId, NodeId, Point2, Polyline};
    use tn_network::NodeKind;

    use crate::lane::LongitudinalDirectionality as LD;
    use crate::{CrossSectionSlice, LaneData, LaneKeepPolicy, RoadNetwork};

    pub fn slice(relative_length: f64, offset: f64, width: f64) -> CrossSectionSlice {
        CrossSectionSlice::new(relative_length, offset, width)
    }

    /// A constant-offset, constant-width element over a `len` metre link.
    pub fn uniform(offset: f64, width: f64, len: f64) -> Vec<CrossSectionSlice> {
        vec![slice(0.0, offset, width), slice(len, offset, width)]
    }

    pub fn node(rn: &mut RoadNetwork, id: &str, x: f64, y: f64) -> NodeId {
        rn.network_mut()
            .add_node(id, Point2::new(x, y), 0.0, NodeKind::Plain)
            .unwrap()
    }

    pub fn cs_link(rn: &mut RoadNetwork, id: &str, a: NodeId, b: NodeId) -> LinkId {
        let lt = rn.network().get_link_type("ROAD").unwrap();
        let pa = rn.network().node(a).unwrap().point();
        let pb = rn.network().node(b).unwrap().point();
        rn.add_cross_section_link(id, a, b, lt, Polyline::straight(pa, pb).unwrap(), LaneKeepPolicy::KeepRight)
            .unwrap()
    }

    pub fn car(rn: &RoadNetwork) -> GtuTypeId {
        rn.network().gtu_types().get("CAR").unwrap()
    }

    pub fn road_user(rn: &RoadNetwork) -> GtuTypeId {
        rn.network().gtu_types().get("ROAD_USER").unwrap()
    }

    pub fn both_lane(rn: &RoadNetwork) -> LaneData {
        LaneData::new().permit(road_user(rn), LD::Both)
    }

    /// One 100 m link A→B with two 3.5 m lanes sharing an edge at offset 0:
    /// "L" centered at +1.75 (design left) and "R" at −1.75.
    pub fn two_lane_link() -> (RoadNetwork, LinkId, ElementId, ElementId) {
        let mut rn = RoadNetwork::with_default_types("two-lane");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let left = rn
            .add_lane(link, "L", uniform(1.75, 3.5, 100.0), both_lane(&rn))
            .unwrap();
        let right = rn
            .add_lane(link, "R", uniform(-1.75, 3.5, 100.0), both_lane(&rn))
            .unwrap();
        (rn, link, left, right)
    }
}

#[cfg(test)]
use fixtures::*;

#[cfg(test)]
mod slices {
    use super::slice;
    use crate::{RoadError, SliceProfile};

    /// The canonical three-slice lane: widths 3.5 → 3.5 → 3.0 over 100 m.
    fn tapering() -> SliceProfile {
        SliceProfile::new(
            "lane",
            vec![slice(0.0, 0.0, 3.5), slice(50.0, 0.0, 3.5), slice(100.0, 0.0, 3.0)],
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn boundary_values_are_exact() {
        let p = tapering();
        assert_eq!(p.width_at(0.0), 3.5);
        assert_eq!(p.width_at(0.5), 3.5);
        assert_eq!(p.width_at(1.0), 3.0);
        assert_eq!(p.begin_width(), 3.5);
        assert_eq!(p.end_width(), 3.0);
    }

    #[test]
    fn local_fraction_interpolates_within_bracket() {
        let p = tapering();
        assert!((p.width_at(0.75) - 3.25).abs() < 1e-12);
        assert!((p.width_at(0.625) - 3.375).abs() < 1e-12);
    }

    #[test]
    fn queries_clamp_to_range() {
        let p = tapering();
        assert_eq!(p.width_at(-0.5), 3.5);
        assert_eq!(p.width_at(1.5), 3.0);
    }

    #[test]
    fn single_slice_is_constant() {
        let p = SliceProfile::new("lane", vec![slice(0.0, 1.0, 3.5)], 100.0).unwrap();
        assert_eq!(p.width_at(0.3), 3.5);
        assert_eq!(p.offset_at(0.9), 1.0);
    }

    #[test]
    fn two_slices_are_linear_over_full_range() {
        let p = SliceProfile::new("lane", vec![slice(0.0, 0.0, 4.0), slice(80.0, 2.0, 2.0)], 80.0)
            .unwrap();
        assert!((p.width_at(0.5) - 3.0).abs() < 1e-12);
        assert!((p.offset_at(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_slice_list_rejected() {
        assert!(matches!(
            SliceProfile::new("lane", vec![], 100.0),
            Err(RoadError::EmptySliceList(_))
        ));
    }

    #[test]
    fn first_slice_must_sit_at_zero() {
        assert!(matches!(
            SliceProfile::new("lane", vec![slice(5.0, 0.0, 3.5), slice(100.0, 0.0, 3.5)], 100.0),
            Err(RoadError::SliceStart { position, .. }) if position == 5.0
        ));
    }

    #[test]
    fn slice_positions_strictly_increase() {
        assert!(matches!(
            SliceProfile::new(
                "lane",
                vec![slice(0.0, 0.0, 3.5), slice(60.0, 0.0, 3.5), slice(60.0, 0.0, 3.0)],
                100.0
            ),
            Err(RoadError::SliceOrder(_))
        ));
    }

    #[test]
    fn last_slice_must_reach_link_length() {
        assert!(matches!(
            SliceProfile::new("lane", vec![slice(0.0, 0.0, 3.5), slice(90.0, 0.0, 3.5)], 100.0),
            Err(RoadError::SliceEnd { .. })
        ));
    }
}

#[cfg(test)]
mod geometry {
    use super::{both_lane, cs_link, node, slice, two_lane_link};
    use crate::{LateralDirectionality, RoadNetwork};

    #[test]
    fn center_line_is_design_line_displaced() {
        let (rn, _, left, _) = two_lane_link();
        let el = rn.element(left).unwrap();
        let line = el.geometry().center_line();
        assert!((line.first().y - 1.75).abs() < 1e-9);
        assert!((line.last().y - 1.75).abs() < 1e-9);
        assert!((el.geometry().length() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn contour_is_closed() {
        let (rn, _, left, _) = two_lane_link();
        let contour = rn.element(left).unwrap().geometry().contour();
        assert_eq!(contour.first(), contour.last());
        assert!(contour.len() >= 5);
    }

    #[test]
    fn boundaries_straddle_the_center() {
        let (rn, _, _, right) = two_lane_link();
        assert!((rn.lateral_center_at(right, 0.5).unwrap() + 1.75).abs() < 1e-9);
        assert!(
            (rn.lateral_boundary_at(right, LateralDirectionality::Left, 0.5).unwrap() - 0.0).abs()
                < 1e-9
        );
        assert!(
            (rn.lateral_boundary_at(right, LateralDirectionality::Right, 0.5).unwrap() + 3.5).abs()
                < 1e-9
        );
        assert!((rn.width_at(right, 0.25).unwrap() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn transverse_extent_spans_all_lanes() {
        let (rn, link, _, _) = two_lane_link();
        let (lo, hi) = rn.start_transverse_extent(link).unwrap();
        assert!((lo + 3.5).abs() < 1e-9);
        assert!((hi - 3.5).abs() < 1e-9);
        assert_eq!(rn.end_transverse_extent(link), rn.start_transverse_extent(link));
    }

    #[test]
    fn varying_offset_follows_slices() {
        let mut rn = RoadNetwork::with_default_types("taper");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let lane = rn
            .add_lane(
                link,
                "L",
                vec![slice(0.0, 0.0, 3.5), slice(100.0, 2.0, 3.5)],
                both_lane(&rn),
            )
            .unwrap();
        let line = rn.element(lane).unwrap().geometry().center_line();
        assert!((line.first().y - 0.0).abs() < 1e-9);
        assert!((line.last().y - 2.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod adjacency {
    use super::{both_lane, car, cs_link, node, road_user, two_lane_link, uniform};
    use crate::lane::LongitudinalDirectionality as LD;
    use crate::{LaneData, LateralDirectionality, Permeable, RoadNetwork, StripeData};

    use LateralDirectionality::{Left, Right};

    #[test]
    fn shared_edge_without_stripe_is_permeable() {
        let (rn, _, left, right) = two_lane_link();
        let ct = car(&rn);
        assert_eq!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap(), vec![left]);
        assert_eq!(rn.accessible_adjacent_lanes(left, Right, ct).unwrap(), vec![right]);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let (rn, _, left, right) = two_lane_link();
        let ct = car(&rn);
        let lefts = rn.accessible_adjacent_lanes(right, Left, ct).unwrap();
        assert_eq!(lefts, vec![left]);
        for l in lefts {
            assert!(rn.accessible_adjacent_lanes(l, Right, ct).unwrap().contains(&right));
        }
    }

    #[test]
    fn no_neighbor_on_the_outer_side() {
        let (rn, _, left, right) = two_lane_link();
        let ct = car(&rn);
        assert!(rn.accessible_adjacent_lanes(left, Left, ct).unwrap().is_empty());
        assert!(rn.accessible_adjacent_lanes(right, Right, ct).unwrap().is_empty());
    }

    #[test]
    fn solid_stripe_blocks_both_ways() {
        let (mut rn, link, left, right) = two_lane_link();
        rn.add_stripe(link, "S", uniform(0.0, 0.2, 100.0), StripeData::solid())
            .unwrap();
        let ct = car(&rn);
        assert!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap().is_empty());
        assert!(rn.accessible_adjacent_lanes(left, Right, ct).unwrap().is_empty());
    }

    #[test]
    fn dashed_stripe_permits_both_ways() {
        let (mut rn, link, left, right) = two_lane_link();
        rn.add_stripe(link, "S", uniform(0.0, 0.2, 100.0), StripeData::dashed())
            .unwrap();
        let ct = car(&rn);
        assert_eq!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap(), vec![left]);
        assert_eq!(rn.accessible_adjacent_lanes(left, Right, ct).unwrap(), vec![right]);
    }

    #[test]
    fn one_way_permeability() {
        let (mut rn, link, left, right) = two_lane_link();
        rn.add_stripe(link, "S", uniform(0.0, 0.2, 100.0), StripeData::permeable_towards(Left))
            .unwrap();
        let ct = car(&rn);
        assert_eq!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap(), vec![left]);
        assert!(rn.accessible_adjacent_lanes(left, Right, ct).unwrap().is_empty());
    }

    #[test]
    fn per_type_rule_overrides_stripe_default() {
        let (mut rn, link, left, right) = two_lane_link();
        let ru = road_user(&rn);
        // Solid for everyone, except road users may cross anywhere.
        rn.add_stripe(
            link,
            "S",
            uniform(0.0, 0.2, 100.0),
            StripeData::solid().rule(ru, Permeable::Both),
        )
        .unwrap();
        let ct = car(&rn);
        // CAR inherits the ROAD_USER rule through the parent chain.
        assert_eq!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap(), vec![left]);
    }

    #[test]
    fn opposing_one_way_lanes_are_never_adjacent() {
        let mut rn = RoadNetwork::with_default_types("dir");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let ru = road_user(&rn);
        let fwd = rn
            .add_lane(link, "F", uniform(-1.75, 3.5, 100.0), LaneData::new().permit(ru, LD::Forward))
            .unwrap();
        let back = rn
            .add_lane(link, "B", uniform(1.75, 3.5, 100.0), LaneData::new().permit(ru, LD::Backward))
            .unwrap();
        let ct = car(&rn);
        // Neither lane permits the other's travel direction.
        assert!(rn.accessible_adjacent_lanes(fwd, Left, ct).unwrap().is_empty());
        assert!(rn.accessible_adjacent_lanes(back, Left, ct).unwrap().is_empty());
    }

    #[test]
    fn forward_and_both_lanes_are_mutual_neighbors() {
        let mut rn = RoadNetwork::with_default_types("mixed");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let ru = road_user(&rn);
        let fwd = rn
            .add_lane(link, "F", uniform(-1.75, 3.5, 100.0), LaneData::new().permit(ru, LD::Forward))
            .unwrap();
        let both = rn
            .add_lane(link, "O", uniform(1.75, 3.5, 100.0), both_lane(&rn))
            .unwrap();
        let ct = car(&rn);
        // A bidirectional lane admits forward traffic, so the round trip
        // must hold in both queries.
        assert_eq!(rn.accessible_adjacent_lanes(fwd, Left, ct).unwrap(), vec![both]);
        assert_eq!(rn.accessible_adjacent_lanes(both, Right, ct).unwrap(), vec![fwd]);
    }

    #[test]
    fn sides_flip_for_backward_travel() {
        let mut rn = RoadNetwork::with_default_types("flip");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let ru = road_user(&rn);
        let back = rn
            .add_lane(link, "B", uniform(1.75, 3.5, 100.0), LaneData::new().permit(ru, LD::Backward))
            .unwrap();
        let other = rn
            .add_lane(link, "O", uniform(-1.75, 3.5, 100.0), both_lane(&rn))
            .unwrap();
        let ct = car(&rn);
        // Traveling backward, the vehicle's LEFT is the design-line RIGHT.
        assert_eq!(rn.accessible_adjacent_lanes(back, Left, ct).unwrap(), vec![other]);
        assert!(rn.accessible_adjacent_lanes(back, Right, ct).unwrap().is_empty());
    }

    #[test]
    fn divergence_at_either_end_breaks_adjacency() {
        use super::slice;
        let mut rn = RoadNetwork::with_default_types("diverge");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let base = rn
            .add_lane(link, "L", uniform(-1.75, 3.5, 100.0), both_lane(&rn))
            .unwrap();
        // Adjacent at the start, 1 m gap by the end.
        rn.add_lane(
            link,
            "D",
            vec![slice(0.0, 1.75, 3.5), slice(100.0, 2.75, 3.5)],
            both_lane(&rn),
        )
        .unwrap();
        let ct = car(&rn);
        assert!(rn.accessible_adjacent_lanes(base, Left, ct).unwrap().is_empty());
    }
}

#[cfg(test)]
mod longitudinal {
    use super::{both_lane, car, cs_link, node, uniform};
    use crate::lane::LongitudinalDirectionality as LD;
    use crate::{LaneData, RoadNetwork};
    use tn_network::TravelDirection;

    /// Two consecutive 100 m links A→B→C with one centered lane each.
    fn chain() -> (RoadNetwork, tn_core::ElementId, tn_core::ElementId) {
        let mut rn = RoadNetwork::with_default_types("chain");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let c = node(&mut rn, "C", 200.0, 0.0);
        let ab = cs_link(&mut rn, "AB", a, b);
        let bc = cs_link(&mut rn, "BC", b, c);
        let lane1 = rn.add_lane(ab, "L1", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        let lane2 = rn.add_lane(bc, "L2", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        (rn, lane1, lane2)
    }

    #[test]
    fn next_lane_across_the_node() {
        let (rn, lane1, lane2) = chain();
        let ct = car(&rn);
        assert_eq!(
            rn.next_lanes(lane1, ct).unwrap(),
            vec![(lane2, TravelDirection::Forward)]
        );
    }

    #[test]
    fn prev_lane_mirrors_next() {
        let (rn, lane1, lane2) = chain();
        let ct = car(&rn);
        assert_eq!(
            rn.prev_lanes(lane2, ct).unwrap(),
            vec![(lane1, TravelDirection::Forward)]
        );
    }

    #[test]
    fn dead_end_is_empty_not_error() {
        let (rn, _, lane2) = chain();
        let ct = car(&rn);
        assert!(rn.next_lanes(lane2, ct).unwrap().is_empty());
    }

    #[test]
    fn reversed_design_line_still_pairs_up() {
        // The second link is registered C→B, so lane1's end must match
        // lane2's *last* center-line point instead of its first.
        let mut rn = RoadNetwork::with_default_types("rev");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let c = node(&mut rn, "C", 200.0, 0.0);
        let ab = cs_link(&mut rn, "AB", a, b);
        let cb = cs_link(&mut rn, "CB", c, b);
        let lane1 = rn.add_lane(ab, "L1", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        let lane2 = rn.add_lane(cb, "L2", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        let ct = car(&rn);
        assert_eq!(
            rn.next_lanes(lane1, ct).unwrap(),
            vec![(lane2, TravelDirection::Forward)]
        );
    }

    #[test]
    fn misaligned_lane_is_not_a_continuation() {
        let mut rn = RoadNetwork::with_default_types("gap");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let c = node(&mut rn, "C", 200.0, 0.0);
        let ab = cs_link(&mut rn, "AB", a, b);
        let bc = cs_link(&mut rn, "BC", b, c);
        let lane1 = rn.add_lane(ab, "L1", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        // 10 m lateral offset: far outside the endpoint margin.
        rn.add_lane(bc, "L2", uniform(10.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        let ct = car(&rn);
        assert!(rn.next_lanes(lane1, ct).unwrap().is_empty());
    }

    #[test]
    fn backward_only_continuation_is_recorded_backward() {
        let mut rn = RoadNetwork::with_default_types("back");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let c = node(&mut rn, "C", 200.0, 0.0);
        let ab = cs_link(&mut rn, "AB", a, b);
        let cb = cs_link(&mut rn, "CB", c, b);
        let ru = super::road_user(&rn);
        let lane1 = rn.add_lane(ab, "L1", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        // On the C→B link, traveling away from B means design-backward.
        let lane2 = rn
            .add_lane(cb, "L2", uniform(0.0, 3.5, 100.0), LaneData::new().permit(ru, LD::Backward))
            .unwrap();
        let ct = car(&rn);
        assert_eq!(
            rn.next_lanes(lane1, ct).unwrap(),
            vec![(lane2, TravelDirection::Backward)]
        );
    }

    #[test]
    fn caches_rebuild_after_structural_edit() {
        let mut rn = RoadNetwork::with_default_types("gen");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let ab = cs_link(&mut rn, "AB", a, b);
        let lane1 = rn.add_lane(ab, "L1", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        let ct = car(&rn);
        assert!(rn.next_lanes(lane1, ct).unwrap().is_empty());

        let c = node(&mut rn, "C", 200.0, 0.0);
        let bc = cs_link(&mut rn, "BC", b, c);
        let lane2 = rn.add_lane(bc, "L2", uniform(0.0, 3.5, 100.0), both_lane(&rn)).unwrap();
        // The earlier empty answer must not be served from the stale cache.
        assert_eq!(
            rn.next_lanes(lane1, ct).unwrap(),
            vec![(lane2, TravelDirection::Forward)]
        );
    }
}

#[cfg(test)]
mod occupancy {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::two_lane_link;
    use crate::{RoadError, RoadListener, RoadNetwork};
    use tn_core::{GtuId, SimTime};

    #[derive(Default)]
    struct Log {
        entered: Vec<(GtuId, String, usize)>,
        left: Vec<(GtuId, String, usize)>,
        entered_link: Vec<(GtuId, String, usize)>,
        left_link: Vec<(GtuId, String, usize)>,
        lanes_added: Vec<(String, usize)>,
        lanes_removed: Vec<(String, String)>,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl RoadListener for Recorder {
        fn lane_added(&mut self, _link: &str, lane: &str, index: usize, _time: SimTime) {
            self.0.borrow_mut().lanes_added.push((lane.to_owned(), index));
        }
        fn lane_removed(&mut self, link: &str, lane: &str, _time: SimTime) {
            self.0.borrow_mut().lanes_removed.push((link.to_owned(), lane.to_owned()));
        }
        fn gtu_entered_lane(&mut self, gtu: GtuId, lane: &str, count: usize, _time: SimTime) {
            self.0.borrow_mut().entered.push((gtu, lane.to_owned(), count));
        }
        fn gtu_left_lane(&mut self, gtu: GtuId, lane: &str, count: usize, _time: SimTime) {
            self.0.borrow_mut().left.push((gtu, lane.to_owned(), count));
        }
        fn gtu_entered_link(&mut self, gtu: GtuId, link: &str, count: usize, _time: SimTime) {
            self.0.borrow_mut().entered_link.push((gtu, link.to_owned(), count));
        }
        fn gtu_left_link(&mut self, gtu: GtuId, link: &str, count: usize, _time: SimTime) {
            self.0.borrow_mut().left_link.push((gtu, link.to_owned(), count));
        }
    }

    #[test]
    fn occupants_stay_ordered_by_fraction() {
        let (mut rn, _, left, _) = two_lane_link();
        rn.enter_lane(GtuId(1), left, 0.6).unwrap();
        rn.enter_lane(GtuId(2), left, 0.2).unwrap();
        rn.enter_lane(GtuId(3), left, 0.4).unwrap();
        let lane = rn.element(left).unwrap().as_lane().unwrap();
        let order: Vec<u32> = lane.gtus().iter().map(|&(g, _)| g.0).collect();
        assert_eq!(order, [2, 3, 1]);
        assert_eq!(lane.gtu_count(), 3);
    }

    #[test]
    fn enter_and_leave_fire_counted_events() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (mut rn, _, left, _) = two_lane_link();
        rn.add_listener(Box::new(Recorder(log.clone())));
        rn.enter_lane(GtuId(1), left, 0.5).unwrap();
        rn.enter_lane(GtuId(2), left, 0.1).unwrap();
        assert_eq!(rn.leave_lane(GtuId(1), left).unwrap(), 1);
        let l = log.borrow();
        assert_eq!(l.entered.len(), 2);
        assert_eq!(l.entered[1].2, 2);
        assert_eq!(l.left, vec![(GtuId(1), "L".to_owned(), 1)]);
    }

    #[test]
    fn leaving_a_lane_not_occupied_fails() {
        let (mut rn, _, left, _) = two_lane_link();
        assert!(matches!(
            rn.leave_lane(GtuId(9), left),
            Err(RoadError::GtuNotOnLane(_))
        ));
    }

    #[test]
    fn link_occupancy_counts_distinct_gtus() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (mut rn, link, left, right) = two_lane_link();
        rn.add_listener(Box::new(Recorder(log.clone())));
        rn.enter_lane(GtuId(1), left, 0.5).unwrap();
        rn.enter_lane(GtuId(2), right, 0.5).unwrap();
        // Lane-change overlap: GTU 1 registers on a second lane of the
        // same link without re-entering the link.
        rn.enter_lane(GtuId(1), right, 0.5).unwrap();
        assert_eq!(
            log.borrow().entered_link,
            vec![(GtuId(1), "AB".to_owned(), 1), (GtuId(2), "AB".to_owned(), 2)]
        );
        assert_eq!(rn.cross_section(link).unwrap().gtu_count(), 2);

        rn.leave_lane(GtuId(1), left).unwrap();
        assert!(log.borrow().left_link.is_empty());
        rn.leave_lane(GtuId(1), right).unwrap();
        assert_eq!(log.borrow().left_link, vec![(GtuId(1), "AB".to_owned(), 1)]);
        assert_eq!(rn.cross_section(link).unwrap().gtu_count(), 1);
    }

    #[test]
    fn removing_a_lane_notifies_and_updates_queries() {
        use crate::LateralDirectionality::Left;

        let log = Rc::new(RefCell::new(Log::default()));
        let (mut rn, link, left, right) = two_lane_link();
        rn.add_listener(Box::new(Recorder(log.clone())));
        let ct = super::car(&rn);
        assert_eq!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap(), vec![left]);
        rn.enter_lane(GtuId(7), left, 0.5).unwrap();

        rn.remove_element(left).unwrap();
        assert_eq!(log.borrow().lanes_removed, vec![("AB".to_owned(), "L".to_owned())]);
        assert!(rn.element(left).is_none());
        assert!(rn.get_element(link, "L").is_none());
        assert_eq!(rn.lanes(link).count(), 1);
        // The occupant went with the lane, and the stale neighbor answer
        // must not survive the structural edit.
        assert_eq!(rn.cross_section(link).unwrap().gtu_count(), 0);
        assert!(rn.accessible_adjacent_lanes(right, Left, ct).unwrap().is_empty());
        assert!(matches!(rn.remove_element(left), Err(RoadError::InvalidElement(_))));
    }

    #[test]
    fn lane_added_events_carry_lane_index() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut rn = RoadNetwork::with_default_types("idx");
        rn.add_listener(Box::new(Recorder(log.clone())));
        let a = super::node(&mut rn, "A", 0.0, 0.0);
        let b = super::node(&mut rn, "B", 100.0, 0.0);
        let link = super::cs_link(&mut rn, "AB", a, b);
        rn.add_lane(link, "L0", super::uniform(1.75, 3.5, 100.0), super::both_lane(&rn))
            .unwrap();
        rn.add_lane(link, "L1", super::uniform(-1.75, 3.5, 100.0), super::both_lane(&rn))
            .unwrap();
        assert_eq!(
            log.borrow().lanes_added,
            vec![("L0".to_owned(), 0), ("L1".to_owned(), 1)]
        );
    }
}

#[cfg(test)]
mod sensors {
    use super::{car, road_user, two_lane_link};
    use crate::{OperationalPlan, RelativePositionKind, RoadError, Sensor};
    use tn_core::SimTime;

    struct ConstantSpeed {
        speed: f64,
    }

    impl OperationalPlan for ConstantSpeed {
        fn time_at_distance(&self, distance: f64) -> Option<SimTime> {
            (distance >= 0.0).then(|| SimTime(distance / self.speed))
        }
    }

    #[test]
    fn sensors_stay_ordered_and_filtered() {
        let (mut rn, _, left, _) = two_lane_link();
        let ru = road_user(&rn);
        rn.add_sensor(left, Sensor::new("far", 80.0, RelativePositionKind::Front, ru))
            .unwrap();
        rn.add_sensor(left, Sensor::new("near", 20.0, RelativePositionKind::Front, ru))
            .unwrap();
        let ct = car(&rn);
        let hits = rn.sensors_between(left, 0.0, 100.0, ct).unwrap();
        let ids: Vec<&str> = hits.iter().map(Sensor::id).collect();
        assert_eq!(ids, ["near", "far"]);
        let windowed = rn.sensors_between(left, 50.0, 100.0, ct).unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id(), "far");
    }

    #[test]
    fn incompatible_type_does_not_trigger() {
        let (mut rn, _, left, _) = two_lane_link();
        let pedestrian = rn.network().gtu_types().get("PEDESTRIAN").unwrap();
        rn.add_sensor(left, Sensor::new("ped", 10.0, RelativePositionKind::Front, pedestrian))
            .unwrap();
        let ct = car(&rn);
        assert!(rn.sensors_between(left, 0.0, 100.0, ct).unwrap().is_empty());
    }

    #[test]
    fn position_outside_lane_rejected() {
        let (mut rn, _, left, _) = two_lane_link();
        let ru = road_user(&rn);
        assert!(matches!(
            rn.add_sensor(left, Sensor::new("s", 150.0, RelativePositionKind::Front, ru)),
            Err(RoadError::SensorPosition { .. })
        ));
    }

    #[test]
    fn trigger_time_interpolates_the_plan() {
        let (mut rn, _, left, _) = two_lane_link();
        let ru = road_user(&rn);
        rn.add_sensor(left, Sensor::new("s", 50.0, RelativePositionKind::Front, ru))
            .unwrap();
        let sensor = rn.element(left).unwrap().as_lane().unwrap().sensors()[0].clone();
        let plan = ConstantSpeed { speed: 10.0 };
        // The GTU front sits 2 m ahead of the reference point.
        let t = sensor.trigger_time(&plan, 0.0, 2.0).unwrap();
        assert!((t.seconds() - 4.8).abs() < 1e-9);
    }
}

#[cfg(test)]
mod construction {
    use super::{both_lane, car, cs_link, node, road_user, uniform};
    use crate::lane::LongitudinalDirectionality as LD;
    use crate::{LaneData, RoadError, RoadNetwork};
    use tn_core::{Point2, Polyline};
    use tn_network::LinkType;

    #[test]
    fn plain_link_has_no_cross_section() {
        let mut rn = RoadNetwork::with_default_types("plain");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let lt = rn.network().get_link_type("ROAD").unwrap();
        let link = rn
            .network_mut()
            .add_link(
                "AB",
                a,
                b,
                lt,
                Polyline::straight(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)).unwrap(),
            )
            .unwrap();
        assert!(matches!(
            rn.add_lane(link, "L", uniform(0.0, 3.5, 100.0), both_lane(&rn)),
            Err(RoadError::NotACrossSectionLink(_))
        ));
    }

    #[test]
    fn duplicate_element_id_on_link_rejected() {
        let mut rn = RoadNetwork::with_default_types("dup");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        rn.add_lane(link, "L", uniform(1.75, 3.5, 100.0), both_lane(&rn)).unwrap();
        assert!(matches!(
            rn.add_lane(link, "L", uniform(-1.75, 3.5, 100.0), both_lane(&rn)),
            Err(RoadError::DuplicateElement { .. })
        ));
    }

    #[test]
    fn lane_directionality_must_fit_link_type() {
        let mut rn = RoadNetwork::with_default_types("oneway");
        let vehicle = rn.network().gtu_types().get("VEHICLE").unwrap();
        let oneway = rn
            .network_mut()
            .add_link_type(LinkType::new("ONEWAY", false).permit(vehicle, LD::Forward))
            .unwrap();
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let line = Polyline::straight(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)).unwrap();
        let link = rn
            .add_cross_section_link("AB", a, b, oneway, line, crate::LaneKeepPolicy::KeepRight)
            .unwrap();
        // A bidirectional lane exceeds a forward-only link type.
        assert!(matches!(
            rn.add_lane(link, "L", uniform(0.0, 3.5, 100.0), LaneData::new().permit(vehicle, LD::Both)),
            Err(RoadError::DirectionalityConflict { .. })
        ));
        // A forward lane fits.
        rn.add_lane(link, "L", uniform(0.0, 3.5, 100.0), LaneData::new().permit(vehicle, LD::Forward))
            .unwrap();
    }

    #[test]
    fn shoulder_and_stripe_are_not_lanes() {
        let mut rn = RoadNetwork::with_default_types("kinds");
        let a = node(&mut rn, "A", 0.0, 0.0);
        let b = node(&mut rn, "B", 100.0, 0.0);
        let link = cs_link(&mut rn, "AB", a, b);
        let shoulder = rn.add_shoulder(link, "SH", uniform(4.0, 1.0, 100.0)).unwrap();
        assert!(!rn.element(shoulder).unwrap().is_lane());
        assert!(matches!(
            rn.enter_lane(tn_core::GtuId(1), shoulder, 0.5),
            Err(RoadError::NotALane(_))
        ));
        assert_eq!(rn.lanes(link).count(), 0);
    }

    #[test]
    fn speed_limits_fall_back_along_the_parent_chain() {
        let rn = RoadNetwork::with_default_types("speed");
        let ru = road_user(&rn);
        let ct = car(&rn);
        let truck = rn.network().gtu_types().get("TRUCK").unwrap();
        let lane = LaneData::new()
            .permit(ru, LD::Both)
            .with_speed_limit(ru, 27.8)
            .with_speed_limit(truck, 22.2);
        let types = rn.network().gtu_types();
        assert_eq!(lane.speed_limit(types, ct), Some(27.8));
        assert_eq!(lane.speed_limit(types, truck), Some(22.2));
        let ship = types.get("SHIP").unwrap();
        assert_eq!(lane.speed_limit(types, ship), None);
    }
}
