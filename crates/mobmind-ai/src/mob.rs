//! Mob state owned by its controller.

use crate::catalog::{SpellList, SpellRepertoire};
use crate::enmity::{EnmityContainer, EnmityTable};
use crate::entity::{
    Allegiance, CurrentAction, EffectSet, EntityKind, EntitySnapshot, LinkProfile, StatusEffect,
};
use crate::flags::{Aggro, Behaviour, RoamFlags, SpecialFlags, UpdateMask};
use crate::mods::MobMods;
use crate::pathfind::{PathFinder, Stationary};
use mobmind_common::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TP at which mob skills may be used at all.
const TP_THRESHOLD: u16 = 1_000;
/// Maximum TP.
const TP_MAX: u16 = 3_000;
/// At or below this HP percent a mob with enough TP always uses a skill.
const DESPERATE_HP_PERCENT: u8 = 25;

/// Where a mob is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    /// Alive but not in the world
    #[default]
    Unspawned,
    /// In the world and idle
    Roaming,
    /// Fighting
    Engaged,
    /// Killed; waiting for removal or respawn
    Dead,
}

/// Job tag. Only the summoner changes controller behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Job {
    /// Melee
    #[default]
    Warrior,
    /// Healer
    WhiteMage,
    /// Nuker
    BlackMage,
    /// Summons an avatar pet before casting
    Summoner,
    /// Commands a beast pet
    Beastmaster,
}

/// A mob and every collaborator handle it owns.
pub struct Mob {
    /// Entity id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Zone the mob lives in
    pub zone: ZoneId,
    /// Side the mob fights on
    pub allegiance: Allegiance,
    /// Job tag
    pub job: Job,

    /// Current position, refreshed by the world
    pub position: Position,
    /// Spawn point
    pub spawn_point: Position,
    /// Melee reach
    pub model_size: f32,
    /// Movement speed; zero never moves
    pub speed: u8,

    /// Current HP
    pub hp: u32,
    /// Maximum HP
    pub max_hp: u32,
    /// Resource gating mob skills
    pub tp: u16,

    /// Detection channels
    pub aggro: Aggro,
    /// Movement quirks
    pub behaviour: Behaviour,
    /// Roam modes
    pub roam_flags: RoamFlags,
    /// Encounter flags
    pub special_flags: SpecialFlags,
    /// Tuning
    pub mods: MobMods,

    /// Inside the post-disengage grace window
    pub neutral: bool,
    /// Name is hidden from clients
    pub name_hidden: bool,
    /// Model is hidden from clients
    pub model_hidden: bool,
    /// Cannot be targeted
    pub untargetable: bool,
    /// Burrowed underground
    pub submerged: bool,
    /// Enraged
    pub rage: bool,
    /// Asked allies for help
    pub called_for_help: bool,
    /// Awards experience on death
    pub give_exp: bool,
    /// Scent tracking disabled
    pub disable_scent: bool,

    /// Mob that owns this one
    pub master: Option<EntityId>,
    /// Pet this mob owns
    pub pet: Option<EntityId>,
    /// Allied mobs that link with this one
    pub party: Vec<EntityId>,
    /// Entity that claimed this mob
    pub owner: Option<EntityId>,

    /// Active status effects
    pub effects: EffectSet,
    /// Duel/confrontation marker
    pub confrontation: Option<u32>,
    /// Current action
    pub action: CurrentAction,
    /// Idle despawn deadline
    pub despawn_at: Option<TickTime>,
    /// Pending network updates
    pub dirty: UpdateMask,

    /// Enmity ranking
    pub enmity: Box<dyn EnmityTable>,
    /// Pathfinding handle
    pub path: Box<dyn PathFinder>,
    /// Known spells
    pub spells: Box<dyn SpellRepertoire>,

    state: Lifecycle,
    battle_target: Option<EntityId>,
}

impl fmt::Debug for Mob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mob")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("position", &self.position)
            .field("hp", &self.hp)
            .field("battle_target", &self.battle_target)
            .field("enmity_len", &self.enmity.len())
            .finish_non_exhaustive()
    }
}

impl Mob {
    /// Creates an unspawned mob with default tuning, no spells and a
    /// stationary pathfinder.
    #[must_use]
    pub fn new(id: EntityId, zone: ZoneId, spawn_point: Position) -> Self {
        Self {
            id,
            name: String::new(),
            zone,
            allegiance: Allegiance::Mob,
            job: Job::default(),
            position: spawn_point,
            spawn_point,
            model_size: 3.0,
            speed: 40,
            hp: 100,
            max_hp: 100,
            tp: 0,
            aggro: Aggro::empty(),
            behaviour: Behaviour::empty(),
            roam_flags: RoamFlags::empty(),
            special_flags: SpecialFlags::empty(),
            mods: MobMods::default(),
            neutral: false,
            name_hidden: false,
            model_hidden: false,
            untargetable: false,
            submerged: false,
            rage: false,
            called_for_help: false,
            give_exp: true,
            disable_scent: false,
            master: None,
            pet: None,
            party: Vec::new(),
            owner: None,
            effects: EffectSet::new(),
            confrontation: None,
            action: CurrentAction::Idle,
            despawn_at: None,
            dirty: UpdateMask::empty(),
            enmity: Box::new(EnmityContainer::new()),
            path: Box::new(Stationary),
            spells: Box::new(SpellList::default()),
            state: Lifecycle::Unspawned,
            battle_target: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the job.
    #[must_use]
    pub fn with_job(mut self, job: Job) -> Self {
        self.job = job;
        self
    }

    /// Sets the detection channels.
    #[must_use]
    pub fn with_aggro(mut self, aggro: Aggro) -> Self {
        self.aggro = aggro;
        self
    }

    /// Sets movement quirks.
    #[must_use]
    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Sets roam modes.
    #[must_use]
    pub fn with_roam_flags(mut self, flags: RoamFlags) -> Self {
        self.roam_flags = flags;
        self
    }

    /// Sets tuning.
    #[must_use]
    pub fn with_mods(mut self, mods: MobMods) -> Self {
        self.mods = mods;
        self
    }

    /// Sets current and maximum HP.
    #[must_use]
    pub fn with_hp(mut self, hp: u32, max_hp: u32) -> Self {
        self.max_hp = max_hp.max(1);
        self.hp = hp.min(self.max_hp);
        self
    }

    /// Sets the party of allied mobs.
    #[must_use]
    pub fn with_party(mut self, party: Vec<EntityId>) -> Self {
        self.party = party;
        self
    }

    /// Replaces the pathfinding handle.
    #[must_use]
    pub fn with_pathfinder(mut self, path: Box<dyn PathFinder>) -> Self {
        self.path = path;
        self
    }

    /// Replaces the spell repertoire.
    #[must_use]
    pub fn with_spells(mut self, spells: Box<dyn SpellRepertoire>) -> Self {
        self.spells = spells;
        self
    }

    /// Replaces the enmity table.
    #[must_use]
    pub fn with_enmity(mut self, enmity: Box<dyn EnmityTable>) -> Self {
        self.enmity = enmity;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    pub(crate) fn set_lifecycle(&mut self, state: Lifecycle) {
        self.state = state;
    }

    /// Current battle target.
    #[must_use]
    pub const fn battle_target(&self) -> Option<EntityId> {
        self.battle_target
    }

    pub(crate) fn set_battle_target(&mut self, target: Option<EntityId>) {
        self.battle_target = target;
    }

    /// Alive: not dead and with HP left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != Lifecycle::Dead && self.hp > 0
    }

    /// In the world, whether fighting or not.
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        matches!(self.state, Lifecycle::Roaming | Lifecycle::Engaged)
    }

    /// Fighting.
    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.state == Lifecycle::Engaged
    }

    /// HP as a percentage of maximum.
    #[must_use]
    pub fn hp_percent(&self) -> u8 {
        let percent = u64::from(self.hp) * 100 / u64::from(self.max_hp.max(1));
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Marks the mob dead. The controller ignores it from now on.
    pub fn kill(&mut self) {
        self.hp = 0;
        self.state = Lifecycle::Dead;
        self.battle_target = None;
        self.dirty |= UpdateMask::HP | UpdateMask::STATUS;
    }

    /// Whether resting would do anything.
    #[must_use]
    pub fn can_rest(&self) -> bool {
        self.hp < self.max_hp
            && !self.effects.has(StatusEffect::Poison)
            && !self.effects.has(StatusEffect::Disease)
    }

    /// Regenerates `ratio` of max HP, capped. Returns whether HP changed.
    pub fn rest(&mut self, ratio: f32) -> bool {
        if !self.can_rest() {
            return false;
        }
        let amount = ((self.max_hp as f32) * ratio.clamp(0.0, 1.0)).max(1.0) as u32;
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp != before
    }

    /// Beyond the home-leash radius.
    #[must_use]
    pub fn is_far_from_home(&self) -> bool {
        self.position.distance(&self.spawn_point) > self.mods.home_leash_radius
    }

    /// Whether the mob may walk back to its spawn point.
    #[must_use]
    pub fn can_roam_home(&self, world_no_despawn: bool) -> bool {
        self.speed > 0 && (world_no_despawn || self.mods.no_despawn || self.mods.roam_home)
    }

    /// Whether the mob may wander.
    #[must_use]
    pub fn can_roam(&self) -> bool {
        self.speed > 0 && self.mods.roam_distance > 0.0
    }

    /// Whether the neutral grace window applies to this mob.
    #[must_use]
    pub fn can_be_neutral(&self) -> bool {
        !self.aggro.is_empty()
    }

    /// Chance in percent of using a mob skill this tick.
    #[must_use]
    pub fn tp_use_chance(&self, has_skills: bool, weapon_skills_enabled: bool) -> u8 {
        if self.tp < TP_THRESHOLD || !has_skills || !weapon_skills_enabled {
            return 0;
        }
        if self.tp >= TP_MAX || self.hp_percent() <= DESPERATE_HP_PERCENT {
            return 100;
        }
        self.mods.tp_use_chance
    }

    /// Clears combat, ownership and posture state before leaving the world.
    pub(crate) fn reset_for_despawn(&mut self) {
        self.enmity.clear_all();
        self.path.clear();
        self.owner = None;
        self.rage = false;
        self.called_for_help = false;
        self.neutral = false;
        self.despawn_at = None;
        self.battle_target = None;
        self.action = CurrentAction::Idle;
        self.name_hidden = false;
        self.model_hidden = false;
        self.untargetable = false;
        self.submerged = false;
        self.dirty |= UpdateMask::STATUS | UpdateMask::HP;
    }

    /// Public state for other controllers to read this step.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: EntityKind::Mob,
            zone: self.zone,
            position: self.position,
            hp_percent: self.hp_percent(),
            dead: !self.is_alive(),
            mounted: false,
            untargetable: self.untargetable,
            allegiance: self.allegiance,
            confrontation: self.confrontation,
            stealth: 0.0,
            effects: self.effects.clone(),
            action: self.action,
            battle_target: self.battle_target,
            pet: self.pet,
            engaged: self.is_engaged(),
            spawned: self.is_spawned(),
            roam_flags: self.roam_flags,
            link: Some(LinkProfile {
                radius: self.mods.link_radius,
                superlink: self.mods.superlink,
                no_link: self.mods.no_link,
                neutral: self.neutral,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mob() -> Mob {
        Mob::new(EntityId::new(), ZoneId::new(1), Position::default())
    }

    #[test]
    fn test_rest_caps_and_reports_change() {
        let mut mob = mob().with_hp(95, 100);
        assert!(mob.rest(0.1));
        assert_eq!(mob.hp, 100);
        assert!(!mob.rest(0.1));
    }

    #[test]
    fn test_rest_blocked_by_poison() {
        let mut mob = mob().with_hp(10, 100);
        mob.effects.insert(StatusEffect::Poison);
        assert!(!mob.rest(0.5));
        assert_eq!(mob.hp, 10);
    }

    #[test]
    fn test_tp_use_chance() {
        let mut mob = mob().with_hp(100, 100);
        mob.tp = 500;
        assert_eq!(mob.tp_use_chance(true, true), 0);

        mob.tp = 1_500;
        assert_eq!(mob.tp_use_chance(true, true), 30);
        assert_eq!(mob.tp_use_chance(false, true), 0);
        assert_eq!(mob.tp_use_chance(true, false), 0);

        mob.hp = 20;
        assert_eq!(mob.tp_use_chance(true, true), 100);

        mob.hp = 100;
        mob.tp = 3_000;
        assert_eq!(mob.tp_use_chance(true, true), 100);
    }

    #[test]
    fn test_roam_home_rules() {
        let mut mob = mob();
        assert!(!mob.can_roam_home(false));
        assert!(mob.can_roam_home(true));

        mob.mods.roam_home = true;
        assert!(mob.can_roam_home(false));

        mob.speed = 0;
        assert!(!mob.can_roam_home(true));
    }

    #[test]
    fn test_far_from_home() {
        let mut mob = mob();
        mob.mods.home_leash_radius = 20.0;
        mob.position = Position::new(25.0, 0.0, 0.0);
        assert!(mob.is_far_from_home());
        mob.position = Position::new(5.0, 0.0, 0.0);
        assert!(!mob.is_far_from_home());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut mob = mob();
        mob.set_lifecycle(Lifecycle::Roaming);
        mob.neutral = true;
        let snap = mob.snapshot();
        assert!(snap.is_roaming());
        assert_eq!(snap.kind, EntityKind::Mob);
        assert!(snap.link.is_some_and(|l| l.neutral));

        mob.kill();
        assert!(mob.snapshot().dead);
        assert!(!mob.is_alive());
    }

    #[test]
    fn test_stealthed_mob_is_untargetable() {
        let mut mob = mob();
        mob.set_lifecycle(Lifecycle::Roaming);
        assert!(!mob.snapshot().is_untargetable());

        mob.untargetable = true;
        assert!(mob.snapshot().is_untargetable());
    }
}
