//! Zone-wide mob registry.
//!
//! Controllers are stored behind their own locks so several mobs can be
//! ticked independently. A step builds one [`ZoneSnapshot`] from every
//! registered mob plus the externally owned entities, ticks each mob against
//! it, then applies the commands addressed to registered mobs.

use crate::catalog::{SkillCatalog, SpellCatalog};
use crate::commands::{CommandBus, MobCommand};
use crate::config::ControllerConfig;
use crate::context::TickContext;
use crate::controller::{MobController, TickOutcome};
use crate::entity::EntitySnapshot;
use crate::hooks::ScriptHooks;
use crate::mob::Lifecycle;
use crate::zone::ZoneSnapshot;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mobmind_common::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Commands a zone step can queue by default.
pub const DEFAULT_BUS_CAPACITY: usize = 4096;

/// Registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A controller with this id is already registered
    #[error("Mob already registered: {0}")]
    AlreadyRegistered(EntityId),

    /// No controller with this id
    #[error("Mob not registered: {0}")]
    NotFound(EntityId),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A controller shared between the registry and its callers.
pub type SharedController = Arc<Mutex<MobController>>;

/// Registered mobs of one zone.
#[derive(Debug)]
pub struct MobRegistry {
    /// Zone the mobs live in
    zone: ZoneId,
    /// Controllers by mob id
    mobs: DashMap<EntityId, SharedController>,
    /// Commands produced during a step
    bus: CommandBus,
}

impl MobRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(zone: ZoneId) -> Self {
        Self::with_capacity(zone, DEFAULT_BUS_CAPACITY)
    }

    /// Creates an empty registry whose step can queue at most `capacity`
    /// commands.
    #[must_use]
    pub fn with_capacity(zone: ZoneId, capacity: usize) -> Self {
        Self {
            zone,
            mobs: DashMap::new(),
            bus: CommandBus::new(capacity),
        }
    }

    /// Zone of the registry.
    #[must_use]
    pub const fn zone(&self) -> ZoneId {
        self.zone
    }

    /// Registers a controller.
    pub fn insert(&self, controller: MobController) -> RegistryResult<SharedController> {
        let id = controller.id();
        match self.mobs.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(id)),
            Entry::Vacant(slot) => {
                let shared = Arc::new(Mutex::new(controller));
                slot.insert(Arc::clone(&shared));
                debug!(mob = %id, "Registered mob");
                Ok(shared)
            },
        }
    }

    /// Unregisters a controller.
    pub fn remove(&self, id: EntityId) -> RegistryResult<SharedController> {
        self.mobs
            .remove(&id)
            .map(|(_, shared)| shared)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Looks up a controller.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<SharedController> {
        self.mobs.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered mobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    /// Whether no mob is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }

    /// Registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.mobs.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Respawns a registered mob.
    pub fn spawn(&self, id: EntityId, now: TickTime) -> RegistryResult<()> {
        let shared = self.get(id).ok_or(RegistryError::NotFound(id))?;
        shared.lock().spawn(now);
        Ok(())
    }

    /// Builds the read-only view of the zone for one step.
    pub fn snapshot<I>(&self, externals: I) -> ZoneSnapshot
    where
        I: IntoIterator<Item = EntitySnapshot>,
    {
        let mut zone = ZoneSnapshot::new(self.zone);
        for entity in externals {
            zone.insert(entity);
        }
        for id in self.ids() {
            if let Some(shared) = self.get(id) {
                zone.insert(shared.lock().snapshot());
            }
        }
        zone
    }

    /// Lets every roaming mob look for candidates to aggro. Returns the
    /// number of new enmity entries.
    pub fn scan_aggro(&self, candidates: &[EntitySnapshot], config: &ControllerConfig) -> usize {
        let mut added = 0;
        for id in self.ids() {
            let Some(shared) = self.get(id) else {
                continue;
            };
            let mut controller = shared.lock();
            if controller.mob().lifecycle() != Lifecycle::Roaming {
                continue;
            }
            for candidate in candidates {
                if controller.mob().enmity.contains(candidate.id) {
                    continue;
                }
                if controller.can_aggro_target(candidate, config) {
                    controller.mob_mut().enmity.add_base_enmity(candidate.id);
                    debug!(mob = %id, target = %candidate.id, "Aggro");
                    added += 1;
                }
            }
        }
        added
    }

    /// Runs one step for every registered mob and applies the commands
    /// addressed to them. Returns the commands meant for the world.
    pub fn tick_all(
        &self,
        now: TickTime,
        config: &ControllerConfig,
        externals: &[EntitySnapshot],
        skills: &dyn SkillCatalog,
        spells: &dyn SpellCatalog,
        scripts: &dyn ScriptHooks,
    ) -> Vec<MobCommand> {
        let zone = self.snapshot(externals.iter().cloned());
        let ctx = TickContext {
            now,
            config,
            zone: &zone,
            skills,
            spells,
            scripts,
            commands: &self.bus,
        };

        for id in self.ids() {
            if let Some(shared) = self.get(id) {
                let outcome = shared.lock().tick(&ctx);
                if outcome != TickOutcome::Inert {
                    trace!(mob = %id, ?outcome, "Ticked");
                }
            }
        }

        self.apply_commands(self.bus.drain())
    }

    /// Applies link and engage requests to registered mobs that are still
    /// roaming. Requests for anything else are returned untouched.
    pub fn apply_commands(&self, commands: Vec<MobCommand>) -> Vec<MobCommand> {
        let mut external = Vec::new();
        for command in commands {
            match command {
                MobCommand::AddLinkEnmity { mob, target } if self.mobs.contains_key(&mob) => {
                    self.with_roaming(mob, |controller| {
                        controller.mob_mut().enmity.add_link_enmity(target);
                    });
                },
                MobCommand::Engage { entity, target } if self.mobs.contains_key(&entity) => {
                    self.with_roaming(entity, |controller| {
                        controller.mob_mut().enmity.add_link_enmity(target);
                        controller.engage(target);
                    });
                },
                other => external.push(other),
            }
        }
        external
    }

    fn with_roaming(&self, id: EntityId, apply: impl FnOnce(&mut MobController)) {
        let Some(shared) = self.get(id) else {
            return;
        };
        let mut controller = shared.lock();
        if controller.mob().lifecycle() == Lifecycle::Roaming {
            apply(&mut controller);
        } else {
            trace!(mob = %id, "Ignoring request for a mob that is not roaming");
        }
    }
}
