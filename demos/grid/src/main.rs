//! grid — smallest demo for the traffic-net road network core.
//!
//! Builds a 3×3 urban grid of two-lane roads plus a park-and-ride centroid
//! wired in through connectors, then runs the queries a traffic simulation
//! would issue every tick: shortest routes under the different weight
//! strategies, route traversal, lane adjacency, and lane occupancy.

use anyhow::{Context, Result};

use tn_core::{GtuId, GtuTypeId, NodeId, Point2, Polyline};
use tn_network::{LinkWeight, NodeKind};
use tn_road::{
    CrossSectionSlice, LaneData, LaneKeepPolicy, LateralDirectionality, LongitudinalDirectionality,
    RelativePositionKind, RoadNetwork, Sensor, StripeData,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID:       usize = 3;
const SPACING:    f64   = 100.0;
const LANE_WIDTH: f64   = 3.5;
const URBAN_LIMIT_MS:  f64 = 13.9; // 50 km/h

// ── Network construction ──────────────────────────────────────────────────────

fn uniform(offset: f64, width: f64, len: f64) -> Vec<CrossSectionSlice> {
    vec![
        CrossSectionSlice::new(0.0, offset, width),
        CrossSectionSlice::new(len, offset, width),
    ]
}

/// A two-lane road with a dashed center stripe, open to all road users in
/// both directions.
fn two_lane_road(rn: &mut RoadNetwork, id: &str, a: NodeId, b: NodeId) -> Result<()> {
    let road = rn.network().get_link_type("ROAD").context("ROAD link type")?;
    let ru = rn.network().gtu_types().get("ROAD_USER").context("ROAD_USER type")?;
    let pa = rn.network().node(a).context("start node")?.point();
    let pb = rn.network().node(b).context("end node")?.point();
    let link = rn.add_cross_section_link(
        id,
        a,
        b,
        road,
        Polyline::straight(pa, pb)?,
        LaneKeepPolicy::KeepRight,
    )?;
    let len = rn.network().link(link).context("link")?.length();
    let lane = LaneData::new()
        .permit(ru, LongitudinalDirectionality::Both)
        .with_speed_limit(ru, URBAN_LIMIT_MS);
    rn.add_lane(link, "L1", uniform(LANE_WIDTH / 2.0, LANE_WIDTH, len), lane.clone())?;
    rn.add_lane(link, "L2", uniform(-LANE_WIDTH / 2.0, LANE_WIDTH, len), lane)?;
    rn.add_stripe(link, "C", uniform(0.0, 0.2, len), StripeData::dashed())?;
    Ok(())
}

fn build_grid(rn: &mut RoadNetwork) -> Result<()> {
    // Intersections n<x><y> on a SPACING-metre grid.
    let mut nodes = [[NodeId::INVALID; GRID]; GRID];
    for x in 0..GRID {
        for y in 0..GRID {
            nodes[x][y] = rn.network_mut().add_node(
                &format!("n{x}{y}"),
                Point2::new(x as f64 * SPACING, y as f64 * SPACING),
                0.0,
                NodeKind::Plain,
            )?;
        }
    }
    // East-west links e<x><y>, south-north links s<x><y>.
    for y in 0..GRID {
        for x in 0..GRID - 1 {
            two_lane_road(rn, &format!("e{x}{y}"), nodes[x][y], nodes[x + 1][y])?;
        }
    }
    for x in 0..GRID {
        for y in 0..GRID - 1 {
            two_lane_road(rn, &format!("s{x}{y}"), nodes[x][y], nodes[x][y + 1])?;
        }
    }

    // Park-and-ride centroid west of the grid, attached by two connectors.
    let park = rn.network_mut().add_node(
        "park",
        Point2::new(-SPACING, SPACING),
        0.0,
        NodeKind::Centroid,
    )?;
    let connector = rn.network().get_link_type("CONNECTOR").context("CONNECTOR link type")?;
    let park_pt = Point2::new(-SPACING, SPACING);
    let n00_pt = Point2::new(0.0, 0.0);
    let n01_pt = Point2::new(0.0, SPACING);
    rn.network_mut().add_connector(
        "park-n00",
        park,
        nodes[0][0],
        connector,
        Polyline::straight(park_pt, n00_pt)?,
        0.3,
    )?;
    rn.network_mut().add_connector(
        "park-n01",
        park,
        nodes[0][1],
        connector,
        Polyline::straight(park_pt, n01_pt)?,
        0.7,
    )?;
    Ok(())
}

// ── Reporting helpers ─────────────────────────────────────────────────────────

fn node_name(rn: &RoadNetwork, node: NodeId) -> String {
    rn.network().node(node).map_or_else(|| "?".to_owned(), |n| n.id().to_owned())
}

fn route_length(rn: &RoadNetwork, nodes: &[NodeId]) -> f64 {
    nodes
        .windows(2)
        .filter_map(|w| {
            rn.network()
                .get_link_between(w[0], w[1])
                .or_else(|| rn.network().get_link_between(w[1], w[0]))
        })
        .filter_map(|l| rn.network().link(l).map(|link| link.length()))
        .sum()
}

fn show_route(rn: &RoadNetwork, label: &str, nodes: &[NodeId]) {
    let names: Vec<String> = nodes.iter().map(|&n| node_name(rn, n)).collect();
    println!(
        "  {label:<28} {:>7.1} m  {}",
        route_length(rn, nodes),
        names.join(" → ")
    );
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== grid — traffic-net road network demo ===");
    println!();

    // 1. Build the network.
    let mut rn = RoadNetwork::with_default_types("grid");
    build_grid(&mut rn)?;
    let car: GtuTypeId = rn.network().gtu_types().get("CAR").context("CAR type")?;
    println!(
        "Network: {} nodes, {} links",
        rn.network().node_count(),
        rn.network().link_count()
    );
    println!();

    // 2. Routes under the three weight strategies.
    let n00 = rn.network().get_node("n00").context("n00")?;
    let n22 = rn.network().get_node("n22").context("n22")?;
    let park = rn.network().get_node("park").context("park")?;

    println!("Routes n00 → n22:");
    let dijkstra = rn.network_mut().shortest_route(car, n00, n22, LinkWeight::Length)?;
    show_route(&rn, "Dijkstra (length)", dijkstra.nodes());
    let astar =
        rn.network_mut()
            .shortest_route(car, n00, n22, LinkWeight::AstarLengthNoConnectors)?;
    show_route(&rn, "A* (no connectors)", astar.nodes());

    // Leaving the park-and-ride must use a connector; reaching n22 must not.
    println!("Routes park → n22:");
    let from_park =
        rn.network_mut()
            .shortest_route(car, park, n22, LinkWeight::LengthNoConnectors)?;
    show_route(&rn, "Dijkstra (no connectors)", from_park.nodes());
    println!();

    // 3. Traverse the Dijkstra route node by node.
    let mut route = dijkstra;
    print!("Traversal:");
    while let Some(node) = route.visit_next_node(rn.network())? {
        print!(" {}", node_name(&rn, node));
    }
    println!();
    println!();

    // 4. Lane queries on the first grid link.
    let e00 = rn.network().get_link("e00").context("e00")?;
    let l1 = rn.get_element(e00, "L1").context("lane L1")?;
    let left = rn.accessible_adjacent_lanes(l1, LateralDirectionality::Left, car)?;
    let right = rn.accessible_adjacent_lanes(l1, LateralDirectionality::Right, car)?;
    let next = rn.next_lanes(l1, car)?;
    println!("Lane e00/L1: {} left neighbor(s), {} right, {} continuation(s)", left.len(), right.len(), next.len());

    // 5. Occupancy and a detector.
    let ru = rn.network().gtu_types().get("ROAD_USER").context("ROAD_USER type")?;
    rn.network_mut().add_gtu(GtuId(0), car)?;
    let count = rn.enter_lane(GtuId(0), l1, 0.25)?;
    rn.add_sensor(l1, Sensor::new("det", 80.0, RelativePositionKind::Front, ru))?;
    let hits = rn.sensors_between(l1, 0.0, SPACING, car)?;
    println!("Lane e00/L1: {count} occupant(s), {} detector(s) ahead", hits.len());

    Ok(())
}
