//! Combat tick and action selection.
//!
//! Candidates are tried in a fixed priority order. Each is gated by its own
//! cooldown; a closed gate or a declined attempt falls through to the next
//! candidate, and the first success ends selection for the tick.

use crate::catalog::{MobSkill, SpellInfo, TargetFlags};
use crate::commands::MobCommand;
use crate::context::TickContext;
use crate::controller::{MobController, TickOutcome};
use crate::entity::{EntitySnapshot, StatusEffect};
use crate::flags::{Behaviour, SpecialFlags, UpdateMask};
use crate::hooks::or_decline;
use crate::mob::Job;
use crate::mods::TeleportMode;
use crate::pathfind::PathFlags;
use mobmind_common::prelude::*;
use tracing::{trace, warn};

/// The action a combat tick settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatAction {
    /// Signature skill
    SpecialSkill(SkillId),
    /// Spell cast
    Spell(SpellId),
    /// Mob skill from the skill list
    MobSkill(SkillId),
    /// Continued a scripted path
    ScriptedPath,
    /// Teleport skill
    Teleport(SkillId),
    /// Skill used in place of a melee swing
    AttackSkill(SkillId),
    /// Copied another mob's position
    MirrorPosition,
    /// Moved toward the target
    Approach,
}

impl MobController {
    pub(crate) fn do_combat_tick(&mut self, ctx: &TickContext<'_>) -> TickOutcome {
        self.resolve_target(ctx.zone);
        let Some(target) = self.validated_target(ctx) else {
            self.disengage(ctx);
            return TickOutcome::Disengaged;
        };

        self.link_against(target, ctx);

        if !self.mob.behaviour.contains(Behaviour::NO_TURN) {
            self.mob.path.look_at(&target.position);
        }

        or_decline(ctx.scripts.on_fight(&self.mob, target), self.mob.id, ());

        let action = self.select_action(target, ctx);
        trace!(mob = %self.mob.id, target = %target.id, ?action, "Combat tick");
        TickOutcome::Combat(action)
    }

    /// Picks and issues at most one action against a validated target.
    pub fn select_action(&mut self, target: &EntitySnapshot, ctx: &TickContext<'_>) -> Option<CombatAction> {
        let now = ctx.now;

        if self.mob.mods.special_skill.is_some()
            && !self.mob.effects.has(StatusEffect::Chainspell)
            && self.timers.special.is_ready(now, self.mob.mods.special_cooldown())
        {
            if let Some(skill) = self.try_special_skill(Some(target), ctx) {
                return Some(CombatAction::SpecialSkill(skill));
            }
        }

        if self.timers.magic.is_ready(now, self.mob.mods.magic_cooldown()) {
            if let Some(spell) = self.try_cast_spell(Some(target), ctx) {
                return Some(CombatAction::Spell(spell));
            }
        }

        if let Some(list) = self.mob.mods.skill_list {
            if self.timers.mob_skill.is_ready(now, self.mob.mods.mobskill_cooldown()) {
                let has_skills = !ctx.skills.skill_list(list).is_empty();
                let chance = self.mob.tp_use_chance(has_skills, self.toggles.weapon_skills);
                if chance > 0 && self.rng.u8(0..100) < chance {
                    if let Some(skill) = self.try_mob_skill(list, target, ctx) {
                        self.timers.mob_skill.stamp(now);
                        return Some(CombatAction::MobSkill(skill));
                    }
                }
            }
        }

        if self.mob.path.is_following_scripted_path() && self.can_follow_path() {
            self.mob.path.follow_path();
            return Some(CombatAction::ScriptedPath);
        }

        if self.mob.mods.teleport == TeleportMode::PreCombat
            && self.timers.special.is_ready(now, self.mob.mods.teleport_cooldown())
        {
            if let Some(skill) = self.try_teleport(self.mob.id, None, ctx) {
                return Some(CombatAction::Teleport(skill));
            }
        }

        if let Some(list) = self.mob.mods.attack_skill_list {
            if self.toggles.auto_attack && self.timers.attack.is_ready(now, self.mob.mods.weapon_delay()) {
                if let Some(skill) = self.try_mob_skill(list, target, ctx) {
                    self.timers.attack.stamp(now);
                    return Some(CombatAction::AttackSkill(skill));
                }
            }
        }

        if let Some(source) = self.mob.mods.share_position.and_then(|id| ctx.zone.entity(id)) {
            self.mob.position = source.position;
            self.mob.dirty |= UpdateMask::POSITION;
            return Some(CombatAction::MirrorPosition);
        }

        self.approach(target, ctx)
    }

    /// Uses the signature skill on itself or `target`. Returns the skill if
    /// it was issued.
    pub(crate) fn try_special_skill(
        &mut self,
        target: Option<&EntitySnapshot>,
        ctx: &TickContext<'_>,
    ) -> Option<SkillId> {
        let id = self.mob.mods.special_skill?;
        if !self.toggles.weapon_skills {
            return None;
        }
        if self.mob.special_flags.contains(SpecialFlags::HIDDEN) && !self.mob.name_hidden {
            return None;
        }

        let skill = match ctx.skills.require_skill(id) {
            Ok(skill) => skill,
            Err(e) => {
                warn!(mob = %self.mob.id, "Special skill unavailable: {e}");
                return None;
            },
        };

        let skill_target = if skill.targets.contains(TargetFlags::SELF) {
            self.mob.id
        } else {
            let target = target?;
            if self.mob.position.distance(&target.position) > skill.range {
                return None;
            }
            target.id
        };

        if !self.skill_accepted(skill_target, skill, ctx) {
            return None;
        }

        self.issue_skill(skill_target, id, ctx);
        self.timers.special.stamp(ctx.now);
        Some(id)
    }

    /// Shuffles a skill list and issues the first usable skill.
    fn try_mob_skill(
        &mut self,
        list: SkillListId,
        target: &EntitySnapshot,
        ctx: &TickContext<'_>,
    ) -> Option<SkillId> {
        let mut candidates = ctx.skills.skill_list(list).to_vec();
        self.rng.shuffle(&mut candidates);

        for id in candidates {
            let Some(skill) = ctx.skills.skill(id) else {
                warn!(mob = %self.mob.id, "{}", CatalogError::SkillNotFound(id));
                continue;
            };

            let (skill_target, distance) = if skill.targets.contains(TargetFlags::ENEMY) {
                (target.id, self.mob.position.distance(&target.position))
            } else if skill.targets.contains(TargetFlags::SELF) {
                (self.mob.id, 0.0)
            } else {
                continue;
            };

            if distance > skill.range {
                continue;
            }
            if !skill.limit_break && !self.skill_accepted(skill_target, skill, ctx) {
                continue;
            }

            self.issue_skill(skill_target, id, ctx);
            return Some(id);
        }
        None
    }

    fn try_teleport(
        &mut self,
        skill_target: EntityId,
        max_distance: Option<f32>,
        ctx: &TickContext<'_>,
    ) -> Option<SkillId> {
        let id = self.mob.mods.teleport_skill?;
        let skill = match ctx.skills.require_skill(id) {
            Ok(skill) => skill,
            Err(e) => {
                warn!(mob = %self.mob.id, "Teleport unavailable: {e}");
                return None;
            },
        };
        if max_distance.is_some_and(|d| d > skill.range) {
            return None;
        }
        self.issue_skill(skill_target, id, ctx);
        self.timers.special.stamp(ctx.now);
        Some(id)
    }

    fn skill_accepted(&self, target: EntityId, skill: &MobSkill, ctx: &TickContext<'_>) -> bool {
        or_decline(ctx.scripts.on_skill_check(&self.mob, target, skill), self.mob.id, false)
    }

    fn issue_skill(&self, target: EntityId, skill: SkillId, ctx: &TickContext<'_>) {
        trace!(mob = %self.mob.id, target = %target, %skill, "Using skill");
        ctx.publish(MobCommand::UseSkill {
            mob: self.mob.id,
            target,
            skill,
        });
    }

    /// Whether the mob may cast at all right now.
    pub fn can_cast_spells(&self, ctx: &TickContext<'_>) -> bool {
        if !self.toggles.magic || !self.mob.spells.has_spells() {
            return false;
        }
        if self.mob.effects.has(StatusEffect::Silence) || self.mob.effects.has(StatusEffect::Mute) {
            return false;
        }
        if self.mob.job == Job::Summoner {
            let pet_alive = self
                .mob
                .pet
                .and_then(|id| ctx.zone.entity(id))
                .is_some_and(|pet| !pet.dead);
            if pet_alive {
                return false;
            }
        }
        true
    }

    /// Picks a spell and casts it. Starts the magic cooldown whenever
    /// casting is permitted, even if nothing ends up cast.
    pub(crate) fn try_cast_spell(
        &mut self,
        target: Option<&EntitySnapshot>,
        ctx: &TickContext<'_>,
    ) -> Option<SpellId> {
        if !self.can_cast_spells(ctx) {
            return None;
        }
        self.timers.magic.stamp(ctx.now);

        let chosen = if self.mob.mods.spell_script {
            let prepared = ctx.scripts.on_magic_prepare(&self.mob, target.map(|t| t.id));
            or_decline(prepared, self.mob.id, None)
        } else if self.first_spell {
            self.first_spell = false;
            self.mob.spells.aggro_spell()
        } else {
            self.mob.spells.spell()
        };

        let spell = chosen?;
        self.cast_spell(spell, target, ctx).then_some(spell)
    }

    /// Resolves the cast target and issues the cast. Returns false if the
    /// spell is unknown or has nobody to land on.
    pub(crate) fn cast_spell(
        &mut self,
        id: SpellId,
        target: Option<&EntitySnapshot>,
        ctx: &TickContext<'_>,
    ) -> bool {
        let spell = match ctx.spells.require_spell(id) {
            Ok(spell) => spell,
            Err(e) => {
                warn!(mob = %self.mob.id, "Cannot cast: {e}");
                return false;
            },
        };

        let cast_target = if spell.targets.contains(TargetFlags::SELF) {
            self.self_spell_target(spell, ctx)
        } else if let Some(target) = target {
            target.id
        } else {
            trace!(mob = %self.mob.id, spell = %id, "No target for offensive spell");
            return false;
        };

        trace!(mob = %self.mob.id, target = %cast_target, spell = %id, "Casting");
        ctx.publish(MobCommand::CastSpell {
            mob: self.mob.id,
            target: cast_target,
            spell: id,
        });
        true
    }

    /// Self spells that may land on party members are sometimes redirected
    /// to the master or to a nearby ally in the same engagement state.
    fn self_spell_target(&mut self, spell: &SpellInfo, ctx: &TickContext<'_>) -> EntityId {
        let me = self.mob.id;
        if !spell.targets.contains(TargetFlags::PLAYER_PARTY) {
            return me;
        }

        if let Some(master) = self.mob.master {
            if self.rng.u32(0..ctx.config.master_redirect_one_in.max(1)) == 0 {
                return master;
            }
        }

        if self.rng.u32(0..ctx.config.party_redirect_one_in.max(1)) == 0 {
            let candidates =
                ctx.zone
                    .allies_within(&self.mob.position, spell.range, self.mob.allegiance, me);
            if !candidates.is_empty() {
                let pick = candidates[self.rng.usize(..candidates.len())];
                let engaged = self.mob.is_engaged();
                let same_state = ctx.zone.entity(pick).is_some_and(|c| c.engaged == engaged);
                return if same_state { pick } else { me };
            }
        }

        me
    }

    fn approach(&mut self, target: &EntitySnapshot, ctx: &TickContext<'_>) -> Option<CombatAction> {
        let distance = self.mob.position.distance(&target.position);
        let out_of_reach = distance > self.mob.model_size || self.mob.path.is_following_path();
        if !out_of_reach || !self.can_follow_path() {
            return None;
        }

        if self.mob.mods.draw_in && distance >= self.mob.model_size * 2.0 {
            ctx.publish(MobCommand::DrawIn {
                mob: self.mob.id,
                target: target.id,
                offset: (self.mob.model_size - ctx.config.draw_in_margin).max(0.0),
            });
        }

        if self.mob.mods.teleport == TeleportMode::ToTarget {
            if !self.timers.special.is_ready(ctx.now, self.mob.mods.teleport_cooldown()) {
                return None;
            }
            return self
                .try_teleport(target.id, Some(distance), ctx)
                .map(CombatAction::Teleport);
        }

        if self.approach_suppressed(distance, ctx) {
            return None;
        }

        self.mob
            .path
            .path_around(&target.position, ctx.config.approach_radius, PathFlags::WALLHACK | PathFlags::RUN);
        self.mob.path.follow_path();
        Some(CombatAction::Approach)
    }

    fn approach_suppressed(&self, distance: f32, ctx: &TickContext<'_>) -> bool {
        let config = ctx.config;

        if self.mob.behaviour.contains(Behaviour::STANDBACK) && distance < config.standback_range {
            return true;
        }

        if self.mob.mods.hp_standback
            && self.mob.hp_percent() > config.hp_standback_percent
            && distance < config.standback_range
        {
            return true;
        }

        self.mob
            .mods
            .spawn_leash
            .is_some_and(|leash| self.mob.position.distance(&self.mob.spawn_point) > leash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SpellList, SpellRole};
    use crate::mob::Lifecycle;
    use crate::mods::MobMods;
    use crate::testing::{mob_at, player_at, spawned, Harness, PathCall};
    use proptest::prelude::*;
    use std::time::Duration;

    const TARGET: u64 = 50;

    fn fire() -> SpellInfo {
        SpellInfo {
            id: SpellId::new(144),
            targets: TargetFlags::ENEMY,
            range: 20.0,
        }
    }

    fn cure() -> SpellInfo {
        SpellInfo {
            id: SpellId::new(1),
            targets: TargetFlags::SELF | TargetFlags::PLAYER_PARTY,
            range: 20.0,
        }
    }

    fn caster_spells() -> Box<SpellList> {
        Box::new(
            SpellList::new(1)
                .with_spell(fire().id, SpellRole::Offensive)
                .with_spell(cure().id, SpellRole::Buff),
        )
    }

    fn harness_with_target(x: f32) -> (Harness, EntitySnapshot) {
        let mut harness = Harness::new();
        harness.spells = harness.spells.clone().with_spell(fire()).with_spell(cure());
        let target = player_at(TARGET, x, 0.0);
        harness.zone.insert(target.clone());
        (harness, target)
    }

    fn uses_and_casts(commands: &[MobCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, MobCommand::UseSkill { .. } | MobCommand::CastSpell { .. }))
            .count()
    }

    #[test]
    fn test_special_skill_preempts_spell_on_cooldown() {
        let (mut harness, target) = harness_with_target(5.0);
        let special = SkillId::new(700);
        harness.skills = harness.skills.clone().with_skill(MobSkill::enemy(special, 10.0));

        let mods = MobMods::default().with_special_skill(special, Duration::from_secs(60));
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods).with_spells(caster_spells()));
        controller.timers_mut().magic.stamp(TickTime::from_secs(95));

        let now = TickTime::from_secs(100);
        let action = controller.select_action(&target, &harness.ctx(now));
        assert_eq!(action, Some(CombatAction::SpecialSkill(special)));
        assert_eq!(
            harness.drain(),
            vec![MobCommand::UseSkill {
                mob: EntityId::from_raw(1),
                target: target.id,
                skill: special,
            }]
        );
        assert_eq!(controller.timers().special.last(), Some(now));
        assert_eq!(controller.timers().magic.last(), Some(TickTime::from_secs(95)));
    }

    #[test]
    fn test_special_out_of_range_falls_through_to_spell() {
        let (mut harness, target) = harness_with_target(15.0);
        let special = SkillId::new(700);
        harness.skills = harness.skills.clone().with_skill(MobSkill::enemy(special, 10.0));

        let mods = MobMods::default().with_special_skill(special, Duration::from_secs(60));
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods).with_spells(caster_spells()));

        let action = controller.select_action(&target, &harness.ctx(TickTime::from_secs(100)));
        assert_eq!(action, Some(CombatAction::Spell(fire().id)));
        assert!(!controller.first_spell);
    }

    #[test]
    fn test_missing_special_data_and_hook_failure_decline() {
        let (mut harness, target) = harness_with_target(2.0);
        let mods = MobMods::default().with_special_skill(SkillId::new(999), Duration::ZERO);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));

        // unknown skill id: falls through to movement, which is in range
        assert_eq!(controller.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);

        harness.skills = harness.skills.clone().with_skill(MobSkill::self_target(SkillId::new(999)));
        harness.scripts.fail = true;
        assert_eq!(controller.select_action(&target, &harness.ctx(TickTime::from_secs(2))), None);
        assert_eq!(harness.scripts.count("on_skill_check"), 1);
        assert!(harness.drain().is_empty());
    }

    #[test]
    fn test_hidden_special_needs_hidden_name() {
        let (mut harness, target) = harness_with_target(2.0);
        let special = SkillId::new(5);
        harness.skills = harness.skills.clone().with_skill(MobSkill::self_target(special));
        let mods = MobMods::default().with_special_skill(special, Duration::ZERO);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));
        controller.mob_mut().special_flags = SpecialFlags::HIDDEN;

        assert_eq!(controller.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);
        controller.mob_mut().name_hidden = true;
        assert_eq!(
            controller.select_action(&target, &harness.ctx(TickTime::from_secs(2))),
            Some(CombatAction::SpecialSkill(special))
        );
    }

    #[test]
    fn test_weapon_skill_toggle_blocks_special() {
        let (mut harness, target) = harness_with_target(2.0);
        let special = SkillId::new(5);
        harness.skills = harness.skills.clone().with_skill(MobSkill::self_target(special));
        let mods = MobMods::default().with_special_skill(special, Duration::ZERO);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));
        controller.toggles_mut().weapon_skills = false;
        assert_eq!(controller.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);
    }

    #[test]
    fn test_first_spell_then_generic() {
        let (mut harness, target) = harness_with_target(5.0);
        let opener = SpellId::new(2);
        let spells = SpellList::new(3)
            .with_spell(opener, SpellRole::Aggro)
            .with_spell(fire().id, SpellRole::Offensive);
        harness.spells = harness.spells.clone().with_spell(SpellInfo {
            id: opener,
            ..fire()
        });

        let mods = MobMods::default().with_magic_cooldown(Duration::ZERO);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods).with_spells(Box::new(spells)));

        let first = controller.select_action(&target, &harness.ctx(TickTime::from_secs(1)));
        assert_eq!(first, Some(CombatAction::Spell(opener)));
        assert!(!controller.first_spell);

        let second = controller.select_action(&target, &harness.ctx(TickTime::from_secs(2)));
        assert!(matches!(second, Some(CombatAction::Spell(_))));
    }

    #[test]
    fn test_silence_and_summoner_pet_block_casting() {
        let (mut harness, _) = harness_with_target(5.0);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_spells(caster_spells()));
        assert!(controller.can_cast_spells(&harness.ctx(TickTime::ZERO)));

        controller.mob_mut().effects.insert(StatusEffect::Silence);
        assert!(!controller.can_cast_spells(&harness.ctx(TickTime::ZERO)));
        controller.mob_mut().effects.remove(StatusEffect::Silence);

        let avatar = player_at(60, 1.0, 0.0);
        harness.zone.insert(avatar.clone());
        controller.mob_mut().job = Job::Summoner;
        controller.mob_mut().pet = Some(avatar.id);
        assert!(!controller.can_cast_spells(&harness.ctx(TickTime::ZERO)));

        if let Some(pet) = harness.zone.entity_mut(avatar.id) {
            pet.dead = true;
        }
        assert!(controller.can_cast_spells(&harness.ctx(TickTime::ZERO)));
    }

    #[test]
    fn test_script_chooses_spell() {
        let (mut harness, target) = harness_with_target(5.0);
        harness.scripts.magic = Some(fire().id);
        let mut mods = MobMods::default();
        mods.spell_script = true;
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods).with_spells(caster_spells()));

        let action = controller.select_action(&target, &harness.ctx(TickTime::from_secs(1)));
        assert_eq!(action, Some(CombatAction::Spell(fire().id)));
        assert_eq!(harness.scripts.count("on_magic_prepare"), 1);
        // the opener is still armed because the script chose
        assert!(controller.first_spell);
    }

    #[test]
    fn test_party_spell_redirects() {
        let (mut harness, _) = harness_with_target(5.0);
        harness.config.master_redirect_one_in = 1;
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0));
        let master = EntityId::from_raw(80);
        controller.mob_mut().master = Some(master);
        assert_eq!(controller.self_spell_target(&cure(), &harness.ctx(TickTime::ZERO)), master);

        // no master: an ally in the same engagement state gets the spell
        controller.mob_mut().master = None;
        harness.config.party_redirect_one_in = 1;
        let mut ally = mob_at(81, 3.0, 0.0);
        ally.set_lifecycle(Lifecycle::Roaming);
        harness.zone.insert(ally.snapshot());
        assert_eq!(
            controller.self_spell_target(&cure(), &harness.ctx(TickTime::ZERO)),
            EntityId::from_raw(81)
        );

        // engaged caster, roaming ally: falls back to self
        controller.engage(EntityId::from_raw(TARGET));
        assert_eq!(
            controller.self_spell_target(&cure(), &harness.ctx(TickTime::ZERO)),
            EntityId::from_raw(1)
        );
    }

    #[test]
    fn test_mob_skill_at_full_tp() {
        let (mut harness, target) = harness_with_target(4.0);
        let list = SkillListId::new(3);
        let claw = SkillId::new(40);
        let far = SkillId::new(41);
        harness.skills = harness
            .skills
            .clone()
            .with_skill(MobSkill::enemy(claw, 6.0))
            .with_skill(MobSkill::enemy(far, 2.0))
            .with_list(list, vec![far, claw]);

        let mods = MobMods::default().with_skill_list(list);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));
        controller.mob_mut().tp = 3_000;

        let now = TickTime::from_secs(1);
        let action = controller.select_action(&target, &harness.ctx(now));
        assert_eq!(action, Some(CombatAction::MobSkill(claw)));
        assert_eq!(controller.timers().mob_skill.last(), Some(now));
    }

    #[test]
    fn test_limit_break_skips_hook() {
        let (mut harness, target) = harness_with_target(4.0);
        let list = SkillListId::new(3);
        let normal = SkillId::new(40);
        let ultimate = SkillId::new(42);
        harness.skills = harness
            .skills
            .clone()
            .with_skill(MobSkill::enemy(normal, 10.0))
            .with_skill(MobSkill::enemy(ultimate, 10.0).limit_break())
            .with_list(list, vec![normal, ultimate]);
        harness.scripts.accept_skills = false;

        let mods = MobMods::default().with_skill_list(list);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));
        controller.mob_mut().tp = 3_000;

        let action = controller.select_action(&target, &harness.ctx(TickTime::from_secs(1)));
        assert_eq!(action, Some(CombatAction::MobSkill(ultimate)));
    }

    #[test]
    fn test_low_tp_skips_mob_skills() {
        let (mut harness, target) = harness_with_target(2.0);
        let list = SkillListId::new(3);
        harness.skills = harness
            .skills
            .clone()
            .with_skill(MobSkill::enemy(SkillId::new(40), 10.0))
            .with_list(list, vec![SkillId::new(40)]);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(MobMods::default().with_skill_list(list)));
        controller.mob_mut().tp = 200;
        assert_eq!(controller.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);
    }

    #[test]
    fn test_scripted_path_continues() {
        let (harness, target) = harness_with_target(10.0);
        let (mut controller, path) = spawned(mob_at(1, 0.0, 0.0));
        {
            let mut state = path.lock();
            state.following = true;
            state.scripted = true;
        }
        let action = controller.select_action(&target, &harness.ctx(TickTime::from_secs(1)));
        assert_eq!(action, Some(CombatAction::ScriptedPath));
        assert_eq!(path.lock().count(&PathCall::FollowPath), 1);
    }

    #[test]
    fn test_pre_combat_teleport() {
        let (mut harness, target) = harness_with_target(10.0);
        let blink = SkillId::new(90);
        harness.skills = harness.skills.clone().with_skill(MobSkill::self_target(blink));
        let mods = MobMods::default().with_teleport(TeleportMode::PreCombat, blink);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));

        let now = TickTime::from_secs(20);
        assert_eq!(
            controller.select_action(&target, &harness.ctx(now)),
            Some(CombatAction::Teleport(blink))
        );
        // cooldown now closed; falls through to walking
        assert_eq!(
            controller.select_action(&target, &harness.ctx(now + Duration::from_secs(1))),
            Some(CombatAction::Approach)
        );
    }

    #[test]
    fn test_teleport_to_target_in_range() {
        let (mut harness, target) = harness_with_target(10.0);
        let blink = SkillId::new(90);
        harness.skills = harness.skills.clone().with_skill(MobSkill::enemy(blink, 15.0));
        let mods = MobMods::default().with_teleport(TeleportMode::ToTarget, blink);
        let (mut controller, path) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));

        assert_eq!(
            controller.select_action(&target, &harness.ctx(TickTime::from_secs(20))),
            Some(CombatAction::Teleport(blink))
        );
        assert_eq!(path.lock().count(&PathCall::FollowPath), 0);
    }

    #[test]
    fn test_attack_skill_list_replaces_melee() {
        let (mut harness, target) = harness_with_target(2.0);
        let list = SkillListId::new(8);
        let bite = SkillId::new(12);
        harness.skills = harness
            .skills
            .clone()
            .with_skill(MobSkill::enemy(bite, 4.0))
            .with_list(list, vec![bite]);
        let mods = MobMods::default().with_attack_skill_list(list);
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));

        let now = TickTime::from_secs(10);
        assert_eq!(
            controller.select_action(&target, &harness.ctx(now)),
            Some(CombatAction::AttackSkill(bite))
        );
        assert_eq!(controller.select_action(&target, &harness.ctx(now + Duration::from_secs(1))), None);
        assert_eq!(controller.timers().attack.last(), Some(now));
    }

    #[test]
    fn test_mirror_position() {
        let (mut harness, target) = harness_with_target(10.0);
        let twin = mob_at(70, 4.0, 4.0);
        harness.zone.insert(twin.snapshot());
        let mods = MobMods::default().with_share_position(twin.id);
        let (mut controller, path) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));

        assert_eq!(
            controller.select_action(&target, &harness.ctx(TickTime::from_secs(1))),
            Some(CombatAction::MirrorPosition)
        );
        assert_eq!(controller.mob().position, twin.position);
        assert!(path.lock().calls.iter().all(|c| !matches!(c, PathCall::PathAround(_))));
    }

    #[test]
    fn test_approach_and_melee_range() {
        let (harness, far_target) = harness_with_target(10.0);
        let (mut controller, path) = spawned(mob_at(1, 0.0, 0.0));

        assert_eq!(
            controller.select_action(&far_target, &harness.ctx(TickTime::from_secs(1))),
            Some(CombatAction::Approach)
        );
        assert_eq!(path.lock().count(&PathCall::PathAround(far_target.position)), 1);

        path.lock().following = false;
        let close = player_at(51, 2.0, 0.0);
        assert_eq!(controller.select_action(&close, &harness.ctx(TickTime::from_secs(2))), None);
    }

    #[test]
    fn test_draw_in() {
        let (harness, target) = harness_with_target(10.0);
        let mut mods = MobMods::default();
        mods.draw_in = true;
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods));
        controller.select_action(&target, &harness.ctx(TickTime::from_secs(1)));
        assert!(harness
            .drain()
            .iter()
            .any(|c| matches!(c, MobCommand::DrawIn { target: t, .. } if *t == target.id)));
    }

    #[test]
    fn test_standback_and_leash_suppress_approach() {
        let (harness, target) = harness_with_target(10.0);

        let (mut standback, _) = spawned(mob_at(1, 0.0, 0.0).with_behaviour(Behaviour::STANDBACK));
        assert_eq!(standback.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);

        let mut mods = MobMods::default();
        mods.hp_standback = true;
        let (mut cautious, _) = spawned(mob_at(2, 0.0, 0.0).with_mods(mods));
        assert_eq!(cautious.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);
        cautious.mob_mut().hp = 50;
        assert_eq!(
            cautious.select_action(&target, &harness.ctx(TickTime::from_secs(2))),
            Some(CombatAction::Approach)
        );

    }

    #[test]
    fn test_standback_ignores_line_of_sight() {
        let (harness, target) = harness_with_target(10.0);
        let (mut standback, path) = spawned(mob_at(1, 0.0, 0.0).with_behaviour(Behaviour::STANDBACK));
        path.lock().can_see = false;
        assert_eq!(standback.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);
    }

    #[test]
    fn test_leash_measures_mob_distance_from_spawn() {
        let mut mods = MobMods::default();
        mods.spawn_leash = Some(15.0);

        // at spawn, target well outside the leash radius
        let (harness, target) = harness_with_target(20.0);
        let (mut at_home, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods.clone()));
        assert_eq!(
            at_home.select_action(&target, &harness.ctx(TickTime::from_secs(1))),
            Some(CombatAction::Approach)
        );

        // past the leash, target close to spawn
        let (harness, target) = harness_with_target(10.0);
        let (mut strayed, _) = spawned(mob_at(2, 0.0, 0.0).with_mods(mods));
        strayed.mob_mut().position = Position::new(20.0, 0.0, 0.0);
        assert_eq!(strayed.select_action(&target, &harness.ctx(TickTime::from_secs(1))), None);
    }

    #[test]
    fn test_combat_tick_disengages_without_target() {
        let harness = Harness::new();
        let (mut controller, _) = spawned(mob_at(1, 0.0, 0.0));
        controller.engage(EntityId::from_raw(TARGET));
        let outcome = controller.tick(&harness.ctx(TickTime::from_secs(1)));
        assert_eq!(outcome, TickOutcome::Disengaged);
        assert_eq!(controller.mob().lifecycle(), Lifecycle::Roaming);
    }

    #[test]
    fn test_combat_tick_turns_and_notifies() {
        let (harness, target) = harness_with_target(10.0);
        let (mut controller, path) = spawned(mob_at(1, 0.0, 0.0));
        controller.mob_mut().enmity.add_base_enmity(target.id);
        controller.engage(target.id);

        let outcome = controller.tick(&harness.ctx(TickTime::from_secs(1)));
        assert_eq!(outcome, TickOutcome::Combat(Some(CombatAction::Approach)));
        assert_eq!(path.lock().count(&PathCall::LookAt(target.position)), 1);
        assert_eq!(harness.scripts.count("on_fight"), 1);

        controller.mob_mut().behaviour = Behaviour::NO_TURN;
        controller.tick(&harness.ctx(TickTime::from_secs(2)));
        assert_eq!(path.lock().count(&PathCall::LookAt(target.position)), 1);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_skill_or_spell_per_tick(
            special_ready in any::<bool>(),
            magic_ready in any::<bool>(),
            tp in 0u16..=3_000,
            distance in 0.5f32..25.0,
            seed in any::<u64>(),
        ) {
            let (mut harness, target) = harness_with_target(distance);
            let special = SkillId::new(700);
            let list = SkillListId::new(3);
            let attack_list = SkillListId::new(4);
            harness.skills = harness
                .skills
                .clone()
                .with_skill(MobSkill::enemy(special, 10.0))
                .with_skill(MobSkill::enemy(SkillId::new(40), 8.0))
                .with_skill(MobSkill::self_target(SkillId::new(41)))
                .with_list(list, vec![SkillId::new(40), SkillId::new(41)])
                .with_list(attack_list, vec![SkillId::new(40)]);

            let mods = MobMods::default()
                .with_special_skill(special, Duration::from_secs(30))
                .with_skill_list(list)
                .with_attack_skill_list(attack_list);
            let (controller, _) = spawned(mob_at(1, 0.0, 0.0).with_mods(mods).with_spells(caster_spells()));
            let mut controller = controller.with_seed(seed);
            controller.mob_mut().tp = tp;

            let now = TickTime::from_secs(100);
            if !special_ready {
                controller.timers_mut().special.stamp(now);
            }
            if !magic_ready {
                controller.timers_mut().magic.stamp(now);
            }

            controller.select_action(&target, &harness.ctx(now));
            prop_assert!(uses_and_casts(&harness.drain()) <= 1);
        }
    }
}
