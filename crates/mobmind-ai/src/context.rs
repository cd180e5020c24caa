//! Everything a controller reads during one tick besides its own mob.

use crate::catalog::{SkillCatalog, SpellCatalog};
use crate::commands::{CommandBus, MobCommand};
use crate::config::ControllerConfig;
use crate::hooks::ScriptHooks;
use crate::zone::ZoneLookup;
use mobmind_common::TickTime;

/// Per-tick inputs shared by every mob in a step.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Current simulation time
    pub now: TickTime,
    /// Shared configuration
    pub config: &'a ControllerConfig,
    /// Public state of the zone at the start of the step
    pub zone: &'a dyn ZoneLookup,
    /// Skill catalog
    pub skills: &'a dyn SkillCatalog,
    /// Spell catalog
    pub spells: &'a dyn SpellCatalog,
    /// Encounter scripts
    pub scripts: &'a dyn ScriptHooks,
    /// Outgoing requests
    pub commands: &'a CommandBus,
}

impl TickContext<'_> {
    /// Queues a request for after the step.
    pub fn publish(&self, command: MobCommand) -> bool {
        self.commands.publish(command)
    }
}
