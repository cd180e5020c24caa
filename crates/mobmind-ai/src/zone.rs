//! Zone-level entity lookup.

use crate::entity::{Allegiance, EntitySnapshot};
use ahash::AHashMap;
use mobmind_common::prelude::*;

/// Resolves entity ids to their public state within one zone.
pub trait ZoneLookup {
    /// The zone being looked up.
    fn zone_id(&self) -> ZoneId;

    /// Public state of an entity, if it exists in this zone.
    fn entity(&self, id: EntityId) -> Option<&EntitySnapshot>;

    /// Live entities of `allegiance` within `radius` of `center`, excluding
    /// `exclude`, in ascending id order.
    fn allies_within(
        &self,
        center: &Position,
        radius: f32,
        allegiance: Allegiance,
        exclude: EntityId,
    ) -> Vec<EntityId>;
}

/// An immutable view of every entity in a zone for one simulation step.
#[derive(Debug, Clone)]
pub struct ZoneSnapshot {
    zone: ZoneId,
    entities: AHashMap<EntityId, EntitySnapshot>,
}

impl ZoneSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new(zone: ZoneId) -> Self {
        Self {
            zone,
            entities: AHashMap::new(),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, entity: EntitySnapshot) -> Self {
        self.insert(entity);
        self
    }

    /// Adds or replaces an entity.
    pub fn insert(&mut self, entity: EntitySnapshot) {
        self.entities.insert(entity.id, entity);
    }

    /// Removes an entity.
    pub fn remove(&mut self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.remove(&id)
    }

    /// Mutable access, for tests and world updates between steps.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntitySnapshot> {
        self.entities.get_mut(&id)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all entities in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.values()
    }
}

impl ZoneLookup for ZoneSnapshot {
    fn zone_id(&self) -> ZoneId {
        self.zone
    }

    fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.get(&id).filter(|e| e.zone == self.zone)
    }

    fn allies_within(
        &self,
        center: &Position,
        radius: f32,
        allegiance: Allegiance,
        exclude: EntityId,
    ) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| {
                e.id != exclude
                    && !e.dead
                    && e.allegiance == allegiance
                    && e.position.distance(center) <= radius
            })
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
