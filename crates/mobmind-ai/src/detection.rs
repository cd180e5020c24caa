//! Aggro and deaggro.
//!
//! Detection channels are tried in a fixed order and the first channel whose
//! range and posture conditions match decides the result, including a
//! failed line-of-sight check. The close-range channels (low HP, casting,
//! weapon skills, abilities) only apply within `close_detect_range`.

use crate::config::ControllerConfig;
use crate::context::TickContext;
use crate::controller::MobController;
use crate::entity::{CurrentAction, EffectFlags, EntitySnapshot, StatusEffect};
use crate::flags::{Aggro, Behaviour};
use tracing::{debug, warn};

impl MobController {
    /// Whether the mob perceives `candidate`. `force_sight` treats the mob
    /// as having sight aggro.
    pub fn can_detect_target(
        &self,
        candidate: &EntitySnapshot,
        force_sight: bool,
        config: &ControllerConfig,
    ) -> bool {
        if candidate.is_untargetable() {
            return false;
        }

        let me = &self.mob.position;
        let them = &candidate.position;
        if me.vertical_distance(them) > config.max_vertical_detect {
            return false;
        }

        let distance = me.horizontal_distance(them) + candidate.stealth;
        let aggro = self.mob.aggro;
        let mods = &self.mob.mods;
        let facing = me.is_facing(them, config.facing_cone_degrees);
        let sneaking = candidate.effects.has(StatusEffect::Sneak);

        if (aggro.contains(Aggro::SIGHT) || force_sight)
            && !candidate.effects.has_flag(EffectFlags::INVISIBLE)
            && distance < mods.sight_range
            && facing
        {
            return self.mob.path.can_see_point(them);
        }

        if aggro.contains(Aggro::TRUE_SIGHT) && distance < mods.sight_range && facing {
            return self.mob.path.can_see_point(them);
        }

        if aggro.contains(Aggro::TRUE_HEARING) && distance < mods.sound_range {
            return self.mob.path.can_see_point(them);
        }

        if self.mob.behaviour.contains(Behaviour::AGGRO_AMBUSH)
            && distance < config.ambush_detect_range
            && !sneaking
        {
            return true;
        }

        if aggro.contains(Aggro::HEARING) && distance < mods.sound_range && !sneaking {
            return self.mob.path.can_see_point(them);
        }

        if distance > config.close_detect_range {
            return false;
        }

        if aggro.contains(Aggro::LOW_HP) && candidate.hp_percent < config.low_hp_detect_percent {
            return self.mob.path.can_see_point(them);
        }

        let noticed = match candidate.action {
            CurrentAction::Casting { costs_mp: true } => aggro.contains(Aggro::MAGIC),
            CurrentAction::WeaponSkill => aggro.contains(Aggro::WEAPONSKILL),
            CurrentAction::JobAbility => aggro.contains(Aggro::JOB_ABILITY),
            CurrentAction::Casting { costs_mp: false } | CurrentAction::Idle => false,
        };
        noticed && self.mob.path.can_see_point(them)
    }

    /// Whether the mob would start a fight with `candidate` unprovoked.
    pub fn can_aggro_target(&self, candidate: &EntitySnapshot, config: &ControllerConfig) -> bool {
        if self.mob.neutral || !self.mob.is_alive() || candidate.is_untargetable() {
            return false;
        }
        self.mob.master.is_none()
            && self.mob.is_spawned()
            && !self.mob.is_engaged()
            && self.can_detect_target(candidate, false, config)
    }

    /// Whether the mob should give up the fight. Invalid targets are cleared
    /// from enmity and the next holder is tried.
    pub fn try_deaggro(&mut self, ctx: &TickContext<'_>) -> bool {
        self.validated_target(ctx).is_none()
    }

    /// Validates the current target, walking down the enmity ranking past
    /// invalid entries. `None` means the mob should deaggro.
    pub(crate) fn validated_target<'a>(&mut self, ctx: &TickContext<'a>) -> Option<&'a EntitySnapshot> {
        let zone = ctx.zone;
        let passes = self.mob.enmity.len() + 1;

        for _ in 0..=passes {
            let Some(target_id) = self.target else {
                let next = self.mob.enmity.highest()?;
                self.change_target(Some(next));
                continue;
            };

            match zone.entity(target_id) {
                Some(target) if self.is_valid_target(target) => {
                    return self.still_tracked(target, ctx).then_some(target);
                },
                found => {
                    debug!(
                        mob = %self.mob.id,
                        target = %target_id,
                        present = found.is_some(),
                        "Dropping invalid target"
                    );
                    self.mob.enmity.clear(target_id);
                    let next = self.mob.enmity.highest();
                    self.change_target(next);
                },
            }
        }

        warn!(mob = %self.mob.id, "Enmity walk did not settle, deaggroing");
        None
    }

    fn is_valid_target(&self, target: &EntitySnapshot) -> bool {
        !target.is_untargetable()
            && target.zone == self.mob.zone
            && target.confrontation == self.mob.confrontation
            && target.allegiance != self.mob.allegiance
    }

    fn still_tracked(&self, target: &EntitySnapshot, ctx: &TickContext<'_>) -> bool {
        let mut detect_now = false;
        let mut timed_deaggro = true;

        if self.mob.aggro.contains(Aggro::SCENT) {
            if self.mob.path.in_water() || target.effects.has(StatusEffect::Deodorize) {
                detect_now = true;
            }
            timed_deaggro = self.mob.disable_scent;
        }

        if timed_deaggro && target.effects.has(StatusEffect::Hide) {
            debug!(mob = %self.mob.id, target = %target.id, "Target hid");
            return false;
        }

        if detect_now && !self.can_detect_target(target, false, ctx.config) {
            debug!(mob = %self.mob.id, target = %target.id, "Lost scent");
            return false;
        }

        true
    }
}
