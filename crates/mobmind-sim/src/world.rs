//! A small scripted zone: a goblin camp and a player walking past it.

use mobmind_ai::prelude::*;
use mobmind_common::prelude::*;
use std::time::Duration;
use tracing::{debug, info};

/// Simulation step length.
pub const STEP: Duration = Duration::from_millis(500);

const ZONE: ZoneId = ZoneId::new(100);
const PLAYER: EntityId = EntityId::from_raw(1_000);
const PLAYER_SPEED: f32 = 2.0;
const ZONE_EDGE: f32 = -40.0;

const GOBLIN_RUSH: SkillId = SkillId::new(1);
const GOBLIN_SKILLS: SkillListId = SkillListId::new(1);
const FIRE: SpellId = SpellId::new(144);

/// Zone state owned by the simulation.
pub struct DemoWorld {
    config: ControllerConfig,
    registry: MobRegistry,
    skills: SkillTable,
    spells: SpellTable,
    players: Vec<EntitySnapshot>,
    respawns: Vec<(EntityId, TickTime)>,
    now: TickTime,
    skills_used: usize,
    spells_cast: usize,
}

impl DemoWorld {
    /// Builds the camp.
    pub fn new(config: ControllerConfig) -> anyhow::Result<Self> {
        let registry = MobRegistry::new(ZONE);
        let goblin = config.family("goblin").cloned().unwrap_or_default();
        let camp = [
            (EntityId::from_raw(1), "Goblin Pathfinder", Position::new(0.0, 0.0, 0.0), Job::Warrior),
            (EntityId::from_raw(2), "Goblin Mugger", Position::new(3.0, 0.0, 4.0), Job::Warrior),
            (EntityId::from_raw(3), "Goblin Smithy", Position::new(-2.0, 0.0, 3.0), Job::BlackMage),
        ];
        let ids: Vec<EntityId> = camp.iter().map(|(id, ..)| *id).collect();

        for (id, name, at, job) in camp {
            let party = ids.iter().copied().filter(|other| *other != id).collect();
            let mut mob = Mob::new(id, ZONE, at)
                .with_name(name)
                .with_job(job)
                .with_aggro(Aggro::SIGHT | Aggro::HEARING)
                .with_mods(goblin.clone().with_skill_list(GOBLIN_SKILLS))
                .with_party(party);
            if job == Job::BlackMage {
                mob = mob.with_spells(Box::new(SpellList::new(id.raw()).with_spell(FIRE, SpellRole::Offensive)));
            }

            let mut controller = MobController::new(mob);
            controller.spawn(TickTime::ZERO);
            registry.insert(controller)?;
        }

        let skills = SkillTable::new()
            .with_skill(MobSkill::enemy(GOBLIN_RUSH, 6.0))
            .with_list(GOBLIN_SKILLS, vec![GOBLIN_RUSH]);
        let spells = SpellTable::new().with_spell(SpellInfo {
            id: FIRE,
            targets: TargetFlags::ENEMY,
            range: 20.0,
        });

        let player = EntitySnapshot::player(PLAYER, ZONE, Position::new(30.0, 0.0, 0.0));
        info!(mobs = registry.len(), "Camp ready");

        Ok(Self {
            config,
            registry,
            skills,
            spells,
            players: vec![player],
            respawns: Vec::new(),
            now: TickTime::ZERO,
            skills_used: 0,
            spells_cast: 0,
        })
    }

    /// Current simulation time.
    pub fn now(&self) -> TickTime {
        self.now
    }

    /// Whether the player is still in the zone.
    pub fn player_present(&self) -> bool {
        !self.players.is_empty()
    }

    /// Number of mobs currently fighting.
    pub fn engaged_count(&self) -> usize {
        self.registry
            .ids()
            .into_iter()
            .filter_map(|id| self.registry.get(id))
            .filter(|shared| shared.lock().mob().is_engaged())
            .count()
    }

    /// Skills and spells issued so far.
    pub fn actions(&self) -> (usize, usize) {
        (self.skills_used, self.spells_cast)
    }

    /// Advances the zone by one step.
    pub fn step(&mut self) -> anyhow::Result<()> {
        self.move_players();

        let aggroed = self.registry.scan_aggro(&self.players, &self.config);
        if aggroed > 0 {
            info!(at = %self.now, aggroed, "Player spotted");
        }

        let commands = self.registry.tick_all(
            self.now,
            &self.config,
            &self.players,
            &self.skills,
            &self.spells,
            &NoScripts,
        );
        for command in commands {
            self.apply(command);
        }

        self.respawn_due()?;
        self.now += STEP;
        Ok(())
    }

    fn move_players(&mut self) {
        for player in &mut self.players {
            player.position.x -= PLAYER_SPEED;
        }
        let before = self.players.len();
        self.players.retain(|p| p.position.x > ZONE_EDGE);
        if self.players.len() < before {
            info!(at = %self.now, "Player left the zone");
        }
    }

    fn apply(&mut self, command: MobCommand) {
        match command {
            MobCommand::UseSkill { mob, target, skill } => {
                self.skills_used += 1;
                info!(%mob, %target, %skill, "Skill");
            },
            MobCommand::CastSpell { mob, target, spell } => {
                self.spells_cast += 1;
                info!(%mob, %target, %spell, "Spell");
            },
            MobCommand::Despawn { mob, respawn_after } => {
                info!(%mob, ?respawn_after, "Despawned");
                self.respawns.push((mob, self.now + respawn_after));
            },
            other => debug!(?other, "Unhandled command"),
        }
    }

    fn respawn_due(&mut self) -> anyhow::Result<()> {
        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) = self.respawns.drain(..).partition(|(_, at)| *at <= now);
        self.respawns = pending;
        for (mob, _) in due {
            self.registry.spawn(mob, now)?;
            info!(%mob, "Respawned");
        }
        Ok(())
    }
}
