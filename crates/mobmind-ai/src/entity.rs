//! Public state of battle entities as seen by a deciding mob.
//!
//! Controllers never hold references into other entities. Each tick they read
//! an [`EntitySnapshot`] of whatever they need to reason about (their target,
//! allies, pets, masters) through a [`ZoneLookup`](crate::zone::ZoneLookup).

use crate::flags::RoamFlags;
use bitflags::bitflags;
use mobmind_common::prelude::*;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Flags carried by status effects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EffectFlags: u8 {
        /// Entity is invisible to normal sight
        const INVISIBLE = 1 << 0;
    }
}

/// Status effects the controller inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEffect {
    /// Masks footsteps from hearing
    Sneak,
    /// Hides from sight
    Invisible,
    /// Concealed; breaks timed scent tracking
    Hide,
    /// Masks scent
    Deodorize,
    /// Cannot cast
    Silence,
    /// Cannot cast
    Mute,
    /// Casting without pause; suppresses the special skill
    Chainspell,
    /// Blocks resting
    Poison,
    /// Blocks resting
    Disease,
}

impl StatusEffect {
    /// Flags this effect contributes while active.
    #[must_use]
    pub const fn flags(self) -> EffectFlags {
        match self {
            Self::Invisible => EffectFlags::INVISIBLE,
            _ => EffectFlags::empty(),
        }
    }
}

/// A small set of active status effects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectSet {
    effects: Vec<StatusEffect>,
    flags: EffectFlags,
}

impl EffectSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, effect: StatusEffect) -> Self {
        self.insert(effect);
        self
    }

    /// Adds an effect. Adding an active effect again is a no-op.
    pub fn insert(&mut self, effect: StatusEffect) {
        if !self.effects.contains(&effect) {
            self.effects.push(effect);
            self.flags |= effect.flags();
        }
    }

    /// Removes an effect and recomputes the flag union.
    pub fn remove(&mut self, effect: StatusEffect) {
        self.effects.retain(|e| *e != effect);
        self.flags = self
            .effects
            .iter()
            .fold(EffectFlags::empty(), |acc, e| acc | e.flags());
    }

    /// Checks whether an effect is active.
    #[must_use]
    pub fn has(&self, effect: StatusEffect) -> bool {
        self.effects.contains(&effect)
    }

    /// Checks whether any active effect carries `flag`.
    #[must_use]
    pub fn has_flag(&self, flag: EffectFlags) -> bool {
        self.flags.intersects(flag)
    }
}

/// What a battle entity is doing this tick.
///
/// Detection reads this instead of asking the entity's controller what type
/// of state it is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentAction {
    /// Nothing notable
    #[default]
    Idle,
    /// Casting a spell
    Casting {
        /// Whether the spell consumes MP
        costs_mp: bool,
    },
    /// Performing a weapon skill
    WeaponSkill,
    /// Using a job ability
    JobAbility,
}

/// Pet sub-kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetKind {
    /// A summoned avatar; guards its master
    Avatar,
    /// Any other pet
    Companion,
}

/// Broad kind of a battle entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A player character
    Player,
    /// A pet
    Pet(PetKind),
    /// A mob
    Mob,
}

/// Which side an entity fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Allegiance {
    /// Hostile monsters
    #[default]
    Mob,
    /// Players and their pets
    Player,
    /// Non-combatants
    Neutral,
}

/// Ally-side linking parameters published by a mob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkProfile {
    /// Distance within which this mob answers a call to link
    pub radius: f32,
    /// Super-link group; matching groups link unconditionally
    pub superlink: Option<u16>,
    /// Never links through proximity
    pub no_link: bool,
    /// Inside its post-disengage grace window
    pub neutral: bool,
}

impl LinkProfile {
    /// Whether a mob standing at `own` answers a link call from a mob at
    /// `caller` belonging to `caller_superlink`.
    #[must_use]
    pub fn can_link(&self, own: &Position, caller: &Position, caller_superlink: Option<u16>) -> bool {
        if let (Some(mine), Some(theirs)) = (self.superlink, caller_superlink) {
            if mine == theirs {
                return true;
            }
        }
        if self.neutral || self.no_link {
            return false;
        }
        own.distance(caller) <= self.radius
    }
}

/// Public state of a battle entity for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// Entity id
    pub id: EntityId,
    /// Entity kind
    pub kind: EntityKind,
    /// Zone the entity is in
    pub zone: ZoneId,
    /// Current position
    pub position: Position,
    /// Health as a percentage of maximum
    pub hp_percent: u8,
    /// Whether the entity is dead
    pub dead: bool,
    /// Riding a non-combat mount
    pub mounted: bool,
    /// Hidden from targeting by a posture
    pub untargetable: bool,
    /// Side the entity fights on
    pub allegiance: Allegiance,
    /// Duel/confrontation marker
    pub confrontation: Option<u32>,
    /// Added to detection distance
    pub stealth: f32,
    /// Active status effects
    pub effects: EffectSet,
    /// Current action
    pub action: CurrentAction,
    /// Current battle target
    pub battle_target: Option<EntityId>,
    /// Own pet
    pub pet: Option<EntityId>,
    /// In combat
    pub engaged: bool,
    /// Present in the world
    pub spawned: bool,
    /// Roam posture flags (mobs only)
    pub roam_flags: RoamFlags,
    /// Linking parameters (mobs only)
    pub link: Option<LinkProfile>,
}

impl EntitySnapshot {
    /// A live, full-health player standing at `position`.
    #[must_use]
    pub fn player(id: EntityId, zone: ZoneId, position: Position) -> Self {
        Self {
            id,
            kind: EntityKind::Player,
            zone,
            position,
            hp_percent: 100,
            dead: false,
            mounted: false,
            untargetable: false,
            allegiance: Allegiance::Player,
            confrontation: None,
            stealth: 0.0,
            effects: EffectSet::new(),
            action: CurrentAction::Idle,
            battle_target: None,
            pet: None,
            engaged: false,
            spawned: true,
            roam_flags: RoamFlags::empty(),
            link: None,
        }
    }

    /// Sets the kind.
    #[must_use]
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the health percentage.
    #[must_use]
    pub fn with_hp_percent(mut self, hp_percent: u8) -> Self {
        self.hp_percent = hp_percent;
        self
    }

    /// Adds a status effect.
    #[must_use]
    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effects.insert(effect);
        self
    }

    /// Sets the current action.
    #[must_use]
    pub fn with_action(mut self, action: CurrentAction) -> Self {
        self.action = action;
        self
    }

    /// Sets the pet.
    #[must_use]
    pub fn with_pet(mut self, pet: EntityId) -> Self {
        self.pet = Some(pet);
        self
    }

    /// Spawned, alive and not in combat.
    #[must_use]
    pub fn is_roaming(&self) -> bool {
        self.spawned && !self.dead && !self.engaged
    }

    /// Whether this entity cannot currently be detected or fought.
    #[must_use]
    pub fn is_untargetable(&self) -> bool {
        self.dead || self.mounted || self.untargetable
    }
}
