//! Requests a controller makes of other entities and of the world.
//!
//! A controller only writes its own mob. Everything else it wants to happen
//! goes onto the [`CommandBus`] and is applied after the step by whoever
//! owns the addressed entity.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use mobmind_common::prelude::*;
use std::time::Duration;
use tracing::warn;

/// A request produced by a mob's tick.
#[derive(Debug, Clone, PartialEq)]
pub enum MobCommand {
    /// Add link enmity toward `target` on a roaming ally
    AddLinkEnmity {
        /// Ally receiving the enmity
        mob: EntityId,
        /// Entity the ally should hate
        target: EntityId,
    },
    /// Force an idle entity into combat
    Engage {
        /// Entity that should engage
        entity: EntityId,
        /// Entity to fight
        target: EntityId,
    },
    /// Execute a mob skill
    UseSkill {
        /// User
        mob: EntityId,
        /// Skill target
        target: EntityId,
        /// Skill
        skill: SkillId,
    },
    /// Start casting a spell
    CastSpell {
        /// Caster
        mob: EntityId,
        /// Spell target
        target: EntityId,
        /// Spell
        spell: SpellId,
    },
    /// Pull a fleeing target back into melee range
    DrawIn {
        /// Mob pulling
        mob: EntityId,
        /// Entity pulled
        target: EntityId,
        /// Distance in front of the mob to place the target
        offset: f32,
    },
    /// Step an entity to a point
    StepTo {
        /// Entity to move
        entity: EntityId,
        /// Destination
        point: Position,
    },
    /// Record a claim on a mob
    Claim {
        /// Claimed mob
        mob: EntityId,
        /// Claiming entity
        owner: EntityId,
    },
    /// Remove a mob from the world and schedule its respawn
    Despawn {
        /// Mob to remove
        mob: EntityId,
        /// Respawn delay
        respawn_after: Duration,
    },
}

impl MobCommand {
    /// The entity whose state the command changes.
    #[must_use]
    pub const fn subject(&self) -> EntityId {
        match self {
            Self::AddLinkEnmity { mob, .. }
            | Self::UseSkill { mob, .. }
            | Self::CastSpell { mob, .. }
            | Self::Claim { mob, .. }
            | Self::Despawn { mob, .. } => *mob,
            Self::Engage { entity, .. } | Self::StepTo { entity, .. } => *entity,
            Self::DrawIn { target, .. } => *target,
        }
    }
}

/// Bounded queue of commands produced during one step.
#[derive(Debug)]
pub struct CommandBus {
    /// Sender for publishing commands
    sender: Sender<MobCommand>,
    /// Receiver for collecting commands
    receiver: Receiver<MobCommand>,
}

impl CommandBus {
    /// Creates a new command bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Publishes a command. Returns false if the bus was full and the
    /// command was dropped.
    pub fn publish(&self, command: MobCommand) -> bool {
        match self.sender.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command) | TrySendError::Disconnected(command)) => {
                warn!(subject = %command.subject(), "Command bus full, dropping {command:?}");
                false
            },
        }
    }

    /// Drains all pending commands in publish order.
    pub fn drain(&self) -> Vec<MobCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.receiver.try_recv() {
            commands.push(command);
        }
        commands
    }
}
