//! Pulling idle allies into a fight.
//!
//! Linking never writes another entity directly. Each request is published
//! as a [`MobCommand`] and applied after the step, where it is dropped if
//! the addressee has meanwhile left the roaming state.

use crate::commands::MobCommand;
use crate::context::TickContext;
use crate::controller::MobController;
use crate::entity::{EntityKind, EntitySnapshot, PetKind};
use crate::flags::RoamFlags;
use tracing::trace;

impl MobController {
    /// Spreads hostility toward the current target. Returns the number of
    /// link requests issued.
    pub fn try_link(&self, ctx: &TickContext<'_>) -> usize {
        match self.target.and_then(|id| ctx.zone.entity(id)) {
            Some(target) => self.link_against(target, ctx),
            None => 0,
        }
    }

    pub(crate) fn link_against(&self, target: &EntitySnapshot, ctx: &TickContext<'_>) -> usize {
        let zone = ctx.zone;
        let me = self.mob.id;
        let mut issued = 0;

        // an idle avatar guards its master
        if let Some(guard) = target.pet.and_then(|id| zone.entity(id)) {
            if guard.battle_target.is_none() && guard.kind == EntityKind::Pet(PetKind::Avatar) {
                ctx.publish(MobCommand::Engage {
                    entity: guard.id,
                    target: me,
                });
                issued += 1;
            }
        }

        if let Some(pet) = self.mob.pet.and_then(|id| zone.entity(id)) {
            if pet.is_roaming() {
                ctx.publish(MobCommand::AddLinkEnmity {
                    mob: pet.id,
                    target: target.id,
                });
                issued += 1;
            }
        }

        let superlink = self.mob.mods.superlink;
        for &ally_id in &self.mob.party {
            if ally_id == me {
                continue;
            }
            let Some(ally) = zone.entity(ally_id) else {
                continue;
            };
            if !ally.is_roaming() {
                continue;
            }
            let Some(link) = &ally.link else {
                continue;
            };
            if !link.can_link(&ally.position, &self.mob.position, superlink) {
                continue;
            }

            ctx.publish(MobCommand::AddLinkEnmity {
                mob: ally.id,
                target: target.id,
            });
            issued += 1;

            if ally.roam_flags.contains(RoamFlags::IGNORE) {
                ctx.publish(MobCommand::Engage {
                    entity: ally.id,
                    target: target.id,
                });
            }
        }

        if let Some(master) = self.mob.master.and_then(|id| zone.entity(id)) {
            let in_range = master
                .link
                .is_some_and(|link| link.can_link(&master.position, &self.mob.position, superlink));
            if master.is_roaming() && in_range {
                ctx.publish(MobCommand::AddLinkEnmity {
                    mob: master.id,
                    target: target.id,
                });
                issued += 1;
            }
        }

        if issued > 0 {
            trace!(mob = %me, target = %target.id, issued, "Linked");
        }
        issued
    }
}
