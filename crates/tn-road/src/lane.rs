//! Lane data: directionality, speed limits, sensors, and occupants.
//!
//! The sensor `trigger_time` computation is the single piece of temporal
//! reasoning in this otherwise spatial core: the lane knows *where* a
//! trigger fires, and an agent-supplied [`OperationalPlan`] interpolates
//! *when* its motion reaches that position.

use rustc_hash::FxHashMap;

use tn_core::{GtuId, GtuTypeId, GtuTypes, SimTime};

use crate::error::{RoadError, RoadResult};

pub use tn_network::LongitudinalDirectionality;

// ── Sensors ───────────────────────────────────────────────────────────────────

/// Which relative position of a GTU triggers a sensor.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelativePositionKind {
    Front,
    Rear,
    Reference,
}

/// An agent's motion plan, supplied by the moving-agent layer.
pub trait OperationalPlan {
    /// The simulated time at which the plan has covered `distance` metres
    /// from its origin, or `None` when the plan ends before reaching it.
    fn time_at_distance(&self, distance: f64) -> Option<SimTime>;
}

/// A sensor attached to a lane at a longitudinal position.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensor {
    id: String,
    /// Metres from the lane start along the center line.
    position: f64,
    trigger: RelativePositionKind,
    /// GTU type (including descendants) this sensor responds to.
    gtu_type: GtuTypeId,
}

impl Sensor {
    pub fn new(id: &str, position: f64, trigger: RelativePositionKind, gtu_type: GtuTypeId) -> Self {
        Self { id: id.to_owned(), position, trigger, gtu_type }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn trigger(&self) -> RelativePositionKind {
        self.trigger
    }

    pub fn gtu_type(&self) -> GtuTypeId {
        self.gtu_type
    }

    /// `true` if this sensor responds to `gtu_type`.
    pub fn applies_to(&self, types: &GtuTypes, gtu_type: GtuTypeId) -> bool {
        types.is_of_type(gtu_type, self.gtu_type)
    }

    /// Expected crossing time: the plan origin sits `lane_start_distance`
    /// metres before this lane's start, and the triggering relative position
    /// sits `relative_offset` metres ahead of the GTU reference point.
    pub fn trigger_time(
        &self,
        plan: &dyn OperationalPlan,
        lane_start_distance: f64,
        relative_offset: f64,
    ) -> Option<SimTime> {
        plan.time_at_distance(lane_start_distance + self.position - relative_offset)
    }
}

// ── LaneData ──────────────────────────────────────────────────────────────────

/// The lane role of a cross-section element.
///
/// Directionality and speed-limit lookups fall back along the GTU-type
/// parent chain; no entry anywhere means "no travel" / "no limit".
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneData {
    directionality: FxHashMap<GtuTypeId, LongitudinalDirectionality>,
    /// m/s.
    speed_limits: FxHashMap<GtuTypeId, f64>,
    /// Position-ordered.
    sensors: Vec<Sensor>,
    /// Occupants ordered by longitudinal fraction.
    gtus: Vec<(GtuId, f64)>,
}

impl LaneData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: permit `gtu_type` with the given directionality.
    pub fn permit(mut self, gtu_type: GtuTypeId, dir: LongitudinalDirectionality) -> Self {
        self.directionality.insert(gtu_type, dir);
        self
    }

    /// Builder-style: speed limit in m/s for a GTU type.
    pub fn with_speed_limit(mut self, gtu_type: GtuTypeId, limit: f64) -> Self {
        self.speed_limits.insert(gtu_type, limit);
        self
    }

    /// Directionality for a GTU type, parent-chain fallback, default `None`.
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

    /// All directionality entries, for construction-time validation.
    pub(crate) fn directionality_entries(
        &self,
    ) -> impl Iterator<Item = (GtuTypeId, LongitudinalDirectionality)> + '_ {
        self.directionality.iter().map(|(&t, &d)| (t, d))
    }

    /// Speed limit in m/s, parent-chain fallback.
    pub fn speed_limit(&self, types: &GtuTypes, gtu_type: GtuTypeId) -> Option<f64> {
        types
            .ancestry(gtu_type)
            .find_map(|t| self.speed_limits.get(&t).copied())
    }

    // ── Sensors ───────────────────────────────────────────────────────────

    /// Sensors in position order.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub(crate) fn add_sensor(&mut self, sensor: Sensor, lane_length: f64) -> RoadResult<()> {
        if sensor.position < 0.0 || sensor.position > lane_length {
            return Err(RoadError::SensorPosition {
                sensor: sensor.id.clone(),
                position: sensor.position,
                length: lane_length,
            });
        }
        let at = self
            .sensors
            .partition_point(|s| s.position <= sensor.position);
        self.sensors.insert(at, sensor);
        Ok(())
    }

    /// Sensors with positions in `[from, to]` that respond to `gtu_type`.
    pub fn sensors_between(
        &self,
        types: &GtuTypes,
        from: f64,
        to: f64,
        gtu_type: GtuTypeId,
    ) -> Vec<&Sensor> {
        self.sensors
            .iter()
            .filter(|s| s.position >= from && s.position <= to)
            .filter(|s| s.applies_to(types, gtu_type))
            .collect()
    }

    // ── Occupants ─────────────────────────────────────────────────────────

    /// Occupants ordered by longitudinal fraction.  Snapshot of the current
    /// list; mutate through the road network's enter/leave operations.
    pub fn gtus(&self) -> &[(GtuId, f64)] {
        &self.gtus
    }

    pub fn gtu_count(&self) -> usize {
        self.gtus.len()
    }

    pub(crate) fn insert_gtu(&mut self, gtu: GtuId, fraction: f64) -> usize {
        let at = self.gtus.partition_point(|&(_, f)| f <= fraction);
        self.gtus.insert(at, (gtu, fraction));
        self.gtus.len()
    }

    pub(crate) fn remove_gtu(&mut self, gtu: GtuId) -> Option<usize> {
        let before = self.gtus.len();
        self.gtus.retain(|&(g, _)| g != gtu);
        (self.gtus.len() < before).then(|| self.gtus.len())
    }
}
