//! Idle behaviour: leashing home, despawn, buffs, postures and wandering.

use crate::commands::MobCommand;
use crate::context::TickContext;
use crate::controller::{MobController, TickOutcome};
use crate::flags::{RoamFlags, UpdateMask};
use crate::hooks::or_decline;
use crate::mob::Job;
use mobmind_common::prelude::*;
use std::f32::consts::PI;
use std::time::Duration;
use tracing::{debug, trace};

/// Distance behind the mob a following pet is asked to stand.
const PET_FOLLOW_OFFSET: f32 = 2.1;

/// The roam action a tick settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamAction {
    /// Started walking back to spawn
    WalkHome,
    /// Too far from home and despawned
    Despawned,
    /// Too far from home but unable to walk back or despawn
    Stranded,
    /// Signature skill
    SpecialSkill(SkillId),
    /// Summoned a pet
    Summon(SpellId),
    /// Cast a buff
    Buff(SpellId),
    /// Hid in ambush
    Ambush,
    /// Went into stealth
    Stealth,
    /// Handed the action to a script
    Event,
    /// Started a wander path
    Wander,
    /// Nothing to do
    Rest,
}

impl MobController {
    pub(crate) fn do_roam_tick(&mut self, ctx: &TickContext<'_>) -> TickOutcome {
        let now = ctx.now;
        let ignoring = self.mob.roam_flags.contains(RoamFlags::IGNORE);

        if !ignoring {
            if let Some(top) = self.mob.enmity.highest() {
                self.engage(top);
                return TickOutcome::Engaged(top);
            }

            if let Some(owner) = self.mob.owner {
                if ctx.zone.entity(owner).is_some_and(|o| !o.dead) {
                    ctx.publish(MobCommand::Claim { mob: self.mob.id, owner });
                    self.mob.enmity.add_base_enmity(owner);
                    self.engage(owner);
                    return TickOutcome::Engaged(owner);
                }
                trace!(mob = %self.mob.id, owner = %owner, "Dropping stale claim");
                self.mob.owner = None;
            }
        }

        if self.mob.despawn_at.is_some_and(|at| at < now) && self.despawn(ctx) {
            return TickOutcome::Despawned;
        }

        if ignoring {
            self.mob.owner = None;
        }

        let mut action = None;
        if self.timers.wait_elapsed(now) {
            self.mob.neutral =
                self.mob.can_be_neutral() && self.timers.in_neutral_window(now, ctx.config.neutral_time());

            if self.mob.path.is_following_path() {
                self.follow_roam_path(ctx);
            } else if self.timers.roam.is_ready(now, self.mob.mods.roam_cooldown()) {
                let taken = self.roam_action(ctx);
                if taken == RoamAction::Despawned {
                    return TickOutcome::Despawned;
                }
                action = Some(taken);
            }
        }

        if self.timers.roam_script.is_ready(now, ctx.config.roam_script_interval()) {
            or_decline(ctx.scripts.on_roam(&self.mob), self.mob.id, ());
            self.timers.roam_script.stamp(now);
        }

        TickOutcome::Roam(action)
    }

    /// Runs one roam decision once the roam cooldown has elapsed.
    pub fn roam_action(&mut self, ctx: &TickContext<'_>) -> RoamAction {
        let now = ctx.now;
        self.mob.called_for_help = false;

        if self.mob.rest(ctx.config.rest_ratio) {
            self.mob.dirty |= UpdateMask::HP;
        }
        if self.mob.hp_percent() == 100 {
            self.mob.give_exp = true;
        }

        if self.mob.is_far_from_home() {
            return self.leash_home(ctx);
        }

        if self.mob.mods.special_skill.is_some()
            && self.timers.special.is_ready(now, self.mob.mods.special_cooldown())
        {
            if let Some(skill) = self.try_special_skill(None, ctx) {
                self.timers.roam.stamp(now);
                return RoamAction::SpecialSkill(skill);
            }
        }

        let magic_ready = self.timers.magic.is_ready(now, self.mob.mods.magic_cooldown());
        if self.mob.job == Job::Summoner && magic_ready && self.can_buff(ctx) {
            self.timers.magic.stamp(now);
            if let Some(spell) = self.cast_buff(ctx) {
                self.timers.roam.stamp(now);
                return RoamAction::Summon(spell);
            }
        } else if self.rng.u8(0..10) < ctx.config.roam_buff_chance && self.can_buff(ctx) {
            if let Some(spell) = self.cast_buff(ctx) {
                self.timers.roam.stamp(now);
                return RoamAction::Buff(spell);
            }
        }

        let flags = self.mob.roam_flags;
        let taken = if flags.contains(RoamFlags::AMBUSH) {
            self.mob.name_hidden = true;
            self.mob.model_hidden = true;
            self.mob.submerged = false;
            self.mob.dirty |= UpdateMask::HP;
            RoamAction::Ambush
        } else if flags.contains(RoamFlags::STEALTH) {
            self.mob.name_hidden = true;
            self.mob.untargetable = true;
            self.mob.dirty |= UpdateMask::HP;
            RoamAction::Stealth
        } else if flags.contains(RoamFlags::EVENT) {
            or_decline(ctx.scripts.on_roam_action(&self.mob), self.mob.id, ());
            RoamAction::Event
        } else if self.mob.can_roam()
            && self.mob.path.roam_around(
                &self.mob.spawn_point,
                self.mob.mods.roam_distance,
                self.mob.mods.roam_turns,
                flags,
            )
        {
            if flags.contains(RoamFlags::WORM) {
                // stay put until fully underground
                self.mob.submerged = true;
                self.mob.name_hidden = true;
                self.mob.dirty |= UpdateMask::HP;
                self.wait(now, ctx.config.worm_submerge());
            } else {
                self.follow_roam_path(ctx);
            }
            return RoamAction::Wander;
        } else {
            RoamAction::Rest
        };

        self.timers.roam.stamp(now);
        taken
    }

    fn leash_home(&mut self, ctx: &TickContext<'_>) -> RoamAction {
        let world_no_despawn = ctx.config.mob_no_despawn;

        if self.mob.can_roam_home(world_no_despawn) && self.mob.path.path_to(&self.mob.spawn_point) {
            self.mob.path.limit_distance(ctx.config.home_step_limit);
            self.follow_roam_path(ctx);
            let credit = self.mob.mods.roam_cooldown() + ctx.config.neutral_time();
            self.timers.roam.stamp_with_credit(ctx.now, credit);
            debug!(mob = %self.mob.id, "Walking home");
            return RoamAction::WalkHome;
        }

        if !self.mob.mods.no_despawn && !world_no_despawn {
            debug!(mob = %self.mob.id, "Too far from home, despawning");
            if self.despawn(ctx) {
                return RoamAction::Despawned;
            }
            // retried on the next tick
            return RoamAction::Stranded;
        }

        self.timers.roam.stamp(ctx.now);
        RoamAction::Stranded
    }

    fn can_buff(&self, ctx: &TickContext<'_>) -> bool {
        self.can_cast_spells(ctx) && self.mob.spells.has_buff_spells()
    }

    fn cast_buff(&mut self, ctx: &TickContext<'_>) -> Option<SpellId> {
        let spell = self.mob.spells.buff_spell()?;
        self.cast_spell(spell, None, ctx).then_some(spell)
    }

    /// Advances the current roam path.
    pub fn follow_roam_path(&mut self, ctx: &TickContext<'_>) {
        if !self.can_follow_path() {
            return;
        }
        self.mob.path.follow_path();

        if let Some(pet) = self.mob.pet.and_then(|id| ctx.zone.entity(id)) {
            if pet.is_roaming() {
                ctx.publish(MobCommand::StepTo {
                    entity: pet.id,
                    point: self.mob.position.near(PET_FOLLOW_OFFSET, PI),
                });
            }
        }

        if !self.mob.path.is_following_path() {
            let mods = &self.mob.mods;
            let window = mods.roam_cooldown_ms / u64::from(mods.roam_rate.max(1));
            let credit = Duration::from_millis(self.rng.u64(0..=window));
            self.timers.roam.stamp_with_credit(ctx.now, credit);

            if self.mob.roam_flags.contains(RoamFlags::WORM) {
                self.mob.submerged = false;
                self.mob.name_hidden = false;
                self.mob.dirty |= UpdateMask::HP;
            }

            if self.mob.roam_flags.contains(RoamFlags::EVENT)
                && self.mob.position.distance(&self.mob.spawn_point) <= self.mob.mods.roam_distance
            {
                self.mob.position.rotation = self.mob.spawn_point.rotation;
                self.mob.dirty |= UpdateMask::POSITION;
            }
        }

        if self.mob.path.on_point() {
            or_decline(ctx.scripts.on_path(&self.mob), self.mob.id, ());
        }
    }
}
