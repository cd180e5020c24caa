//! Per-mob tuning ("mob modifiers").
//!
//! Families of mobs share a [`MobMods`] defined in data; individual spawns
//! copy and adjust it.

use mobmind_common::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a mob uses its teleport skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportMode {
    /// Never teleports
    #[default]
    None,
    /// Teleports as soon as combat allows
    PreCombat,
    /// Teleports next to a distant target instead of walking
    ToTarget,
}

/// Per-mob tuning values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobMods {
    /// Sight detection range
    pub sight_range: f32,
    /// Hearing detection range
    pub sound_range: f32,
    /// Distance within which this mob answers link calls
    pub link_radius: f32,
    /// Super-link group
    pub superlink: Option<u16>,
    /// Never links through proximity
    pub no_link: bool,

    /// Signature skill
    pub special_skill: Option<SkillId>,
    /// Cooldown of the signature skill
    pub special_cooldown_ms: u64,
    /// Cooldown between spell casts
    pub magic_cooldown_ms: u64,
    /// Cooldown between mob skills
    pub mobskill_cooldown_ms: u64,
    /// Chance per tick to use a mob skill, in percent
    pub tp_use_chance: u8,
    /// Mob skills drawn from in combat
    pub skill_list: Option<SkillListId>,
    /// Skills that replace melee swings
    pub attack_skill_list: Option<SkillListId>,
    /// Delay between melee swings
    pub weapon_delay_ms: u64,

    /// Teleport usage
    pub teleport: TeleportMode,
    /// Teleport skill
    pub teleport_skill: Option<SkillId>,
    /// Cooldown between teleports
    pub teleport_cooldown_ms: u64,

    /// Mob whose position this mob mirrors in combat
    pub share_position: Option<EntityId>,
    /// Mob whose target this mob adopts
    pub share_target: Option<EntityId>,
    /// Pulls targets that run away back to melee
    pub draw_in: bool,
    /// Holds back while healthy
    pub hp_standback: bool,
    /// Maximum distance from spawn while chasing
    pub spawn_leash: Option<f32>,

    /// Cooldown between roam actions
    pub roam_cooldown_ms: u64,
    /// Wander radius around spawn
    pub roam_distance: f32,
    /// Turns per wandering path
    pub roam_turns: u8,
    /// Divisor of the random credit applied when a roam path finishes
    pub roam_rate: u8,
    /// Walks home instead of despawning even when despawning is allowed
    pub roam_home: bool,
    /// Distance from spawn beyond which the mob is away from home
    pub home_leash_radius: f32,

    /// Never despawns when away from home
    pub no_despawn: bool,
    /// Idle time after disengaging before the mob despawns
    pub idle_despawn_ms: Option<u64>,
    /// Delay before a despawned mob respawns
    pub respawn_ms: u64,
    /// Spell choice is driven by a script
    pub spell_script: bool,
}

impl Default for MobMods {
    fn default() -> Self {
        Self {
            sight_range: 15.0,
            sound_range: 8.0,
            link_radius: 10.0,
            superlink: None,
            no_link: false,
            special_skill: None,
            special_cooldown_ms: 0,
            magic_cooldown_ms: 10_000,
            mobskill_cooldown_ms: 0,
            tp_use_chance: 30,
            skill_list: None,
            attack_skill_list: None,
            weapon_delay_ms: 3_000,
            teleport: TeleportMode::None,
            teleport_skill: None,
            teleport_cooldown_ms: 15_000,
            share_position: None,
            share_target: None,
            draw_in: false,
            hp_standback: false,
            spawn_leash: None,
            roam_cooldown_ms: 20_000,
            roam_distance: 10.0,
            roam_turns: 1,
            roam_rate: 10,
            roam_home: false,
            home_leash_radius: 50.0,
            no_despawn: false,
            idle_despawn_ms: None,
            respawn_ms: 300_000,
            spell_script: false,
        }
    }
}

impl MobMods {
    /// Sets the signature skill and its cooldown.
    #[must_use]
    pub fn with_special_skill(mut self, skill: SkillId, cooldown: Duration) -> Self {
        self.special_skill = Some(skill);
        self.special_cooldown_ms = millis(cooldown);
        self
    }

    /// Sets the mob skill list.
    #[must_use]
    pub fn with_skill_list(mut self, list: SkillListId) -> Self {
        self.skill_list = Some(list);
        self
    }

    /// Replaces melee swings with a skill list.
    #[must_use]
    pub fn with_attack_skill_list(mut self, list: SkillListId) -> Self {
        self.attack_skill_list = Some(list);
        self
    }

    /// Sets the spell cooldown.
    #[must_use]
    pub fn with_magic_cooldown(mut self, cooldown: Duration) -> Self {
        self.magic_cooldown_ms = millis(cooldown);
        self
    }

    /// Sets detection ranges.
    #[must_use]
    pub fn with_ranges(mut self, sight: f32, sound: f32) -> Self {
        self.sight_range = sight;
        self.sound_range = sound;
        self
    }

    /// Sets the link radius.
    #[must_use]
    pub fn with_link_radius(mut self, radius: f32) -> Self {
        self.link_radius = radius;
        self
    }

    /// Sets the super-link group.
    #[must_use]
    pub fn with_superlink(mut self, group: u16) -> Self {
        self.superlink = Some(group);
        self
    }

    /// Configures teleporting.
    #[must_use]
    pub fn with_teleport(mut self, mode: TeleportMode, skill: SkillId) -> Self {
        self.teleport = mode;
        self.teleport_skill = Some(skill);
        self
    }

    /// Adopts another mob's target.
    #[must_use]
    pub fn with_share_target(mut self, source: EntityId) -> Self {
        self.share_target = Some(source);
        self
    }

    /// Mirrors another mob's position.
    #[must_use]
    pub fn with_share_position(mut self, source: EntityId) -> Self {
        self.share_position = Some(source);
        self
    }

    /// Disables despawning when away from home.
    #[must_use]
    pub fn with_no_despawn(mut self) -> Self {
        self.no_despawn = true;
        self
    }

    /// Sets the idle-despawn interval.
    #[must_use]
    pub fn with_idle_despawn(mut self, after: Duration) -> Self {
        self.idle_despawn_ms = Some(millis(after));
        self
    }

    /// Sets the roam cooldown.
    #[must_use]
    pub fn with_roam_cooldown(mut self, cooldown: Duration) -> Self {
        self.roam_cooldown_ms = millis(cooldown);
        self
    }

    /// Special skill cooldown.
    #[must_use]
    pub fn special_cooldown(&self) -> Duration {
        Duration::from_millis(self.special_cooldown_ms)
    }

    /// Spell cooldown.
    #[must_use]
    pub fn magic_cooldown(&self) -> Duration {
        Duration::from_millis(self.magic_cooldown_ms)
    }

    /// Mob skill cooldown.
    #[must_use]
    pub fn mobskill_cooldown(&self) -> Duration {
        Duration::from_millis(self.mobskill_cooldown_ms)
    }

    /// Melee swing delay.
    #[must_use]
    pub fn weapon_delay(&self) -> Duration {
        Duration::from_millis(self.weapon_delay_ms)
    }

    /// Teleport cooldown.
    #[must_use]
    pub fn teleport_cooldown(&self) -> Duration {
        Duration::from_millis(self.teleport_cooldown_ms)
    }

    /// Roam action cooldown.
    #[must_use]
    pub fn roam_cooldown(&self) -> Duration {
        Duration::from_millis(self.roam_cooldown_ms)
    }

    /// Respawn delay.
    #[must_use]
    pub fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_ms)
    }

    /// Idle-despawn interval.
    #[must_use]
    pub fn idle_despawn(&self) -> Option<Duration> {
        self.idle_despawn_ms.map(Duration::from_millis)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
