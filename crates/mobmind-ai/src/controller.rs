//! The per-tick mob decision engine.
//!
//! A [`MobController`] owns one mob. Each simulation step the world calls
//! [`tick`](MobController::tick), which routes to the combat path while the
//! mob is engaged and to the roam path while it is idle. Sub-policies live in
//! sibling modules as further `impl MobController` blocks:
//!
//! - targeting: which entity the mob is fighting
//! - detection: aggro and deaggro
//! - linking: pulling idle allies into the fight
//! - actions: skill, spell, attack and approach selection
//! - roam: idle behaviour, leashing and despawn

use crate::actions::CombatAction;
use crate::commands::MobCommand;
use crate::context::TickContext;
use crate::entity::{CurrentAction, EntitySnapshot};
use crate::flags::UpdateMask;
use crate::mob::{Lifecycle, Mob};
use crate::roam::RoamAction;
use crate::timers::Timers;
use mobmind_common::prelude::*;
use std::time::Duration;
use tracing::{debug, warn};

/// Capabilities scripts can switch off on a single mob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    /// Special and mob skills
    pub weapon_skills: bool,
    /// Spell casting
    pub magic: bool,
    /// Melee and skill-based auto-attacks
    pub auto_attack: bool,
    /// Path following
    pub movement: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            weapon_skills: true,
            magic: true,
            auto_attack: true,
            movement: true,
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Dead or not spawned
    Inert,
    /// Fought; the action chosen, if any
    Combat(Option<CombatAction>),
    /// Lost its target and returned to roaming
    Disengaged,
    /// Entered combat against this entity
    Engaged(EntityId),
    /// Idle behaviour; the roam action taken, if any
    Roam(Option<RoamAction>),
    /// Left the world
    Despawned,
}

/// Decision engine for a single mob.
#[derive(Debug)]
pub struct MobController {
    pub(crate) mob: Mob,
    pub(crate) timers: Timers,
    pub(crate) toggles: Toggles,
    pub(crate) target: Option<EntityId>,
    pub(crate) first_spell: bool,
    pub(crate) rng: fastrand::Rng,
}

impl MobController {
    /// Wraps a mob. The random source is seeded from the mob id.
    #[must_use]
    pub fn new(mob: Mob) -> Self {
        let seed = mob.id.raw();
        Self {
            mob,
            timers: Timers::default(),
            toggles: Toggles::default(),
            target: None,
            first_spell: true,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Reseeds the random source.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Id of the controlled mob.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.mob.id
    }

    /// The controlled mob.
    #[must_use]
    pub const fn mob(&self) -> &Mob {
        &self.mob
    }

    /// Mutable access for the world (position refresh, damage, effects).
    pub fn mob_mut(&mut self) -> &mut Mob {
        &mut self.mob
    }

    /// Cooldown state.
    #[must_use]
    pub const fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Mutable cooldown state.
    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    /// Capability switches.
    #[must_use]
    pub const fn toggles(&self) -> Toggles {
        self.toggles
    }

    /// Mutable capability switches.
    pub fn toggles_mut(&mut self) -> &mut Toggles {
        &mut self.toggles
    }

    /// Entity currently being fought.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Public state of the mob.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        self.mob.snapshot()
    }

    /// Runs one decision cycle.
    pub fn tick(&mut self, ctx: &TickContext<'_>) -> TickOutcome {
        if !self.mob.is_alive() {
            return TickOutcome::Inert;
        }
        match self.mob.lifecycle() {
            Lifecycle::Engaged => self.do_combat_tick(ctx),
            Lifecycle::Roaming => self.do_roam_tick(ctx),
            Lifecycle::Unspawned | Lifecycle::Dead => TickOutcome::Inert,
        }
    }

    /// Places the mob in the world: roaming, empty enmity, clean timers.
    pub fn spawn(&mut self, now: TickTime) {
        if self.mob.hp == 0 {
            self.mob.hp = self.mob.max_hp;
        }
        self.mob.reset_for_despawn();
        self.mob.position = self.mob.spawn_point;
        self.mob.set_lifecycle(Lifecycle::Roaming);
        self.timers = Timers::default();
        self.target = None;
        self.first_spell = true;
        self.mob.dirty |= UpdateMask::POSITION;
        debug!(mob = %self.mob.id, at = %now, "Spawned");
    }

    /// Enters combat against `target`. Returns false if the mob cannot
    /// engage or is already engaged.
    pub fn engage(&mut self, target: EntityId) -> bool {
        if !self.mob.is_alive() || self.mob.lifecycle() != Lifecycle::Roaming {
            return false;
        }
        self.mob.set_lifecycle(Lifecycle::Engaged);
        self.mob.despawn_at = None;
        self.change_target(Some(target));
        self.mob.dirty |= UpdateMask::STATUS;
        debug!(mob = %self.mob.id, target = %target, "Engaged");
        true
    }

    /// Leaves combat and returns to roaming.
    pub fn disengage(&mut self, ctx: &TickContext<'_>) {
        let now = ctx.now;
        let credit = self.mob.mods.roam_cooldown() + ctx.config.neutral_time();
        self.timers.roam.stamp_with_credit(now, credit);
        self.timers.attack.stamp(now);
        self.timers.neutral_since = Some(now);
        self.mob.neutral = true;
        self.mob.path.clear();

        if let Some(after) = self.mob.mods.idle_despawn() {
            self.mob.despawn_at = Some(now + after);
        }

        self.mob.rage = false;
        self.mob.owner = None;
        self.mob.called_for_help = false;
        self.mob.action = CurrentAction::Idle;
        self.mob.dirty |= UpdateMask::HP | UpdateMask::STATUS;
        self.mob.enmity.clear_all();

        self.change_target(None);
        self.mob.set_lifecycle(Lifecycle::Roaming);
        debug!(mob = %self.mob.id, "Disengaged");
    }

    /// Leaves the world and asks for a respawn after the mob's delay.
    ///
    /// The mob stays spawned when the request cannot be queued, so a respawn
    /// is never lost. Returns whether the mob left the world.
    pub fn despawn(&mut self, ctx: &TickContext<'_>) -> bool {
        let queued = ctx.publish(MobCommand::Despawn {
            mob: self.mob.id,
            respawn_after: self.mob.mods.respawn_delay(),
        });
        if !queued {
            warn!(mob = %self.mob.id, "Despawn deferred, command bus full");
            return false;
        }

        self.mob.reset_for_despawn();
        self.mob.set_lifecycle(Lifecycle::Unspawned);
        self.timers = Timers::default();
        self.target = None;
        debug!(mob = %self.mob.id, "Despawned");
        true
    }

    /// Suspends roaming for `duration`.
    pub fn wait(&mut self, now: TickTime, duration: Duration) {
        self.timers.wait(now, duration);
    }

    /// Whether path following is currently allowed.
    pub(crate) fn can_follow_path(&self) -> bool {
        self.toggles.movement && self.mob.speed > 0
    }
}
