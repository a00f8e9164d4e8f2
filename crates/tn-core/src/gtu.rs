//! Vehicle (GTU) type registry with a parent hierarchy.
//!
//! A GTU — *generalized travel unit* — is any moving agent: car, truck, bus,
//! bicycle, pedestrian, ship, train.  GTU types form a forest: `CAR` is a
//! child of `VEHICLE`, which is a child of `ROAD_USER`.  Compatibility and
//! permeability lookups that find no entry for a concrete type fall back
//! along the parent chain, so rules can be painted once at `ROAD_USER` level
//! and refined per concrete type where needed.
//!
//! Types are interned: registering returns a compact [`GtuTypeId`] used as a
//! cache key everywhere else in the workspace.

use rustc_hash::FxHashMap;

use crate::error::{CoreError, CoreResult};
use crate::ids::GtuTypeId;

/// One registered GTU type.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GtuType {
    id: String,
    parent: Option<GtuTypeId>,
}

impl GtuType {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<GtuTypeId> {
        self.parent
    }
}

/// The interning registry for GTU types.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GtuTypes {
    types: Vec<GtuType>,
    index: FxHashMap<String, GtuTypeId>,
}

impl GtuTypes {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the default type hierarchy:
    ///
    /// ```text
    /// ROAD_USER ─┬─ PEDESTRIAN
    ///            ├─ BICYCLE
    ///            └─ VEHICLE ─┬─ CAR
    ///                        ├─ TRUCK
    ///                        └─ BUS
    /// WATERWAY_USER ── SHIP
    /// RAILWAY_USER ── TRAIN
    /// ```
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        let road_user = reg.intern("ROAD_USER", None);
        reg.intern("PEDESTRIAN", Some(road_user));
        reg.intern("BICYCLE", Some(road_user));
        let vehicle = reg.intern("VEHICLE", Some(road_user));
        reg.intern("CAR", Some(vehicle));
        reg.intern("TRUCK", Some(vehicle));
        reg.intern("BUS", Some(vehicle));
        let waterway_user = reg.intern("WATERWAY_USER", None);
        reg.intern("SHIP", Some(waterway_user));
        let railway_user = reg.intern("RAILWAY_USER", None);
        reg.intern("TRAIN", Some(railway_user));
        reg
    }

    /// Return the id for `id`, registering it under `parent` if new.
    fn intern(&mut self, id: &str, parent: Option<GtuTypeId>) -> GtuTypeId {
        if let Some(&t) = self.index.get(id) {
            return t;
        }
        let type_id = GtuTypeId(self.types.len() as u16);
        self.types.push(GtuType { id: id.to_owned(), parent });
        self.index.insert(id.to_owned(), type_id);
        type_id
    }

    /// Register a new type under an optional parent and return its id.
    pub fn register(&mut self, id: &str, parent: Option<GtuTypeId>) -> CoreResult<GtuTypeId> {
        if self.index.contains_key(id) {
            return Err(CoreError::DuplicateGtuType(id.to_owned()));
        }
        if let Some(p) = parent {
            if p.index() >= self.types.len() {
                return Err(CoreError::UnknownGtuType(p.to_string()));
            }
        }
        Ok(self.intern(id, parent))
    }

    /// Look up a type id by name.
    pub fn get(&self, id: &str) -> Option<GtuTypeId> {
        self.index.get(id).copied()
    }

    /// The record for a type id, if the handle is valid.
    pub fn gtu_type(&self, id: GtuTypeId) -> Option<&GtuType> {
        self.types.get(id.index())
    }

    /// The name of a type id; `"?"` for an invalid handle (display contexts
    /// only — lookups go through [`GtuTypes::gtu_type`]).
    pub fn name(&self, id: GtuTypeId) -> &str {
        self.types.get(id.index()).map_or("?", |t| t.id.as_str())
    }

    /// The parent of a type, if any.
    pub fn parent(&self, id: GtuTypeId) -> Option<GtuTypeId> {
        self.types.get(id.index()).and_then(|t| t.parent)
    }

    /// `true` if `child` is `ancestor` or a (transitive) descendant of it.
    pub fn is_of_type(&self, child: GtuTypeId, ancestor: GtuTypeId) -> bool {
        let mut cur = Some(child);
        while let Some(t) = cur {
            if t == ancestor {
                return true;
            }
            cur = self.parent(t);
        }
        false
    }

    /// Walk from `start` up the parent chain, yielding `start` first.
    pub fn ancestry(&self, start: GtuTypeId) -> impl Iterator<Item = GtuTypeId> + '_ {
        let mut cur = Some(start);
        std::iter::from_fn(move || {
            let t = cur?;
            cur = self.parent(t);
            Some(t)
        })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
