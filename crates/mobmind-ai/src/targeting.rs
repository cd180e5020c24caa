//! Target resolution.

use crate::controller::MobController;
use crate::zone::ZoneLookup;
use mobmind_common::EntityId;
use tracing::trace;

impl MobController {
    /// Re-derives the current target: a shared source mob's live target if
    /// configured, otherwise this mob's top enmity holder.
    pub fn resolve_target(&mut self, zone: &dyn ZoneLookup) {
        let shared = self
            .mob
            .mods
            .share_target
            .and_then(|source| zone.entity(source))
            .and_then(|source| source.battle_target)
            .filter(|target| zone.entity(*target).is_some_and(|t| !t.dead));

        let next = shared.or_else(|| self.mob.enmity.highest());
        self.change_target(next);
    }

    /// Assigns the current target. Reassigning the same id is harmless.
    pub fn change_target(&mut self, target: Option<EntityId>) {
        if self.target != target {
            trace!(mob = %self.mob.id, from = ?self.target, to = ?target, "Target changed");
        }
        self.target = target;
        self.mob.set_battle_target(target);
    }
}
