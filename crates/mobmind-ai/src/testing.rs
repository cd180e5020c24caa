//! Fake collaborators for unit tests.

use crate::catalog::{MobSkill, SkillTable, SpellTable};
use crate::commands::{CommandBus, MobCommand};
use crate::config::ControllerConfig;
use crate::context::TickContext;
use crate::controller::MobController;
use crate::entity::EntitySnapshot;
use crate::flags::RoamFlags;
use crate::hooks::{HookError, HookResult, ScriptHooks};
use crate::mob::Mob;
use crate::pathfind::{PathFinder, PathFlags};
use crate::zone::ZoneSnapshot;
use mobmind_common::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

pub(crate) const ZONE: ZoneId = ZoneId::new(1);

/// Calls recorded by [`FakePath`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathCall {
    LookAt(Position),
    FollowPath,
    PathTo(Position),
    PathAround(Position),
    RoamAround,
    Clear,
    LimitDistance(f32),
}

/// Scripted pathfinder state, shared between the test and the mob.
#[derive(Debug)]
pub(crate) struct PathState {
    pub following: bool,
    pub scripted: bool,
    pub can_see: bool,
    pub in_water: bool,
    pub on_point: bool,
    pub plans_succeed: bool,
    pub finish_on_follow: bool,
    pub calls: Vec<PathCall>,
}

impl Default for PathState {
    fn default() -> Self {
        Self {
            following: false,
            scripted: false,
            can_see: true,
            in_water: false,
            on_point: false,
            plans_succeed: true,
            finish_on_follow: false,
            calls: Vec::new(),
        }
    }
}

impl PathState {
    pub fn count(&self, call: &PathCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePath {
    state: Arc<Mutex<PathState>>,
}

impl FakePath {
    pub fn new() -> (Self, Arc<Mutex<PathState>>) {
        let path = Self::default();
        let state = Arc::clone(&path.state);
        (path, state)
    }

    fn plan(&self, call: PathCall) -> bool {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.plans_succeed {
            state.following = true;
        }
        state.plans_succeed
    }
}

impl PathFinder for FakePath {
    fn look_at(&mut self, point: &Position) {
        self.state.lock().calls.push(PathCall::LookAt(*point));
    }

    fn is_following_path(&self) -> bool {
        self.state.lock().following
    }

    fn is_following_scripted_path(&self) -> bool {
        let state = self.state.lock();
        state.following && state.scripted
    }

    fn follow_path(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(PathCall::FollowPath);
        if state.finish_on_follow {
            state.following = false;
        }
    }

    fn path_to(&mut self, point: &Position) -> bool {
        self.plan(PathCall::PathTo(*point))
    }

    fn path_around(&mut self, point: &Position, _radius: f32, _flags: PathFlags) -> bool {
        self.plan(PathCall::PathAround(*point))
    }

    fn roam_around(&mut self, _origin: &Position, _max_distance: f32, _turns: u8, _flags: RoamFlags) -> bool {
        self.plan(PathCall::RoamAround)
    }

    fn can_see_point(&self, _point: &Position) -> bool {
        self.state.lock().can_see
    }

    fn in_water(&self) -> bool {
        self.state.lock().in_water
    }

    fn on_point(&self) -> bool {
        self.state.lock().on_point
    }

    fn clear(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(PathCall::Clear);
        state.following = false;
        state.scripted = false;
    }

    fn limit_distance(&mut self, distance: f32) {
        self.state.lock().calls.push(PathCall::LimitDistance(distance));
    }
}

/// Script hooks that record every call.
#[derive(Debug)]
pub(crate) struct RecordingScripts {
    pub calls: Mutex<Vec<&'static str>>,
    pub accept_skills: bool,
    pub fail: bool,
    pub magic: Option<SpellId>,
}

impl Default for RecordingScripts {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            accept_skills: true,
            fail: false,
            magic: None,
        }
    }
}

impl RecordingScripts {
    fn record(&self, hook: &'static str) -> HookResult<()> {
        self.calls.lock().push(hook);
        if self.fail {
            return Err(HookError::Script {
                hook,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    pub fn count(&self, hook: &str) -> usize {
        self.calls.lock().iter().filter(|h| **h == hook).count()
    }
}

impl ScriptHooks for RecordingScripts {
    fn on_skill_check(&self, _mob: &Mob, _target: EntityId, _skill: &MobSkill) -> HookResult<bool> {
        self.record("on_skill_check")?;
        Ok(self.accept_skills)
    }

    fn on_fight(&self, _mob: &Mob, _target: &EntitySnapshot) -> HookResult<()> {
        self.record("on_fight")
    }

    fn on_roam(&self, _mob: &Mob) -> HookResult<()> {
        self.record("on_roam")
    }

    fn on_roam_action(&self, _mob: &Mob) -> HookResult<()> {
        self.record("on_roam_action")
    }

    fn on_path(&self, _mob: &Mob) -> HookResult<()> {
        self.record("on_path")
    }

    fn on_magic_prepare(&self, _mob: &Mob, _target: Option<EntityId>) -> HookResult<Option<SpellId>> {
        self.record("on_magic_prepare")?;
        Ok(self.magic)
    }
}

/// Owns everything a [`TickContext`] borrows.
pub(crate) struct Harness {
    pub config: ControllerConfig,
    pub zone: ZoneSnapshot,
    pub skills: SkillTable,
    pub spells: SpellTable,
    pub scripts: RecordingScripts,
    pub bus: CommandBus,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            zone: ZoneSnapshot::new(ZONE),
            skills: SkillTable::new(),
            spells: SpellTable::new(),
            scripts: RecordingScripts::default(),
            bus: CommandBus::new(256),
        }
    }

    pub fn ctx(&self, now: TickTime) -> TickContext<'_> {
        TickContext {
            now,
            config: &self.config,
            zone: &self.zone,
            skills: &self.skills,
            spells: &self.spells,
            scripts: &self.scripts,
            commands: &self.bus,
        }
    }

    pub fn drain(&self) -> Vec<MobCommand> {
        self.bus.drain()
    }
}

pub(crate) fn player_at(raw: u64, x: f32, z: f32) -> EntitySnapshot {
    EntitySnapshot::player(EntityId::from_raw(raw), ZONE, Position::new(x, 0.0, z))
}

pub(crate) fn mob_at(raw: u64, x: f32, z: f32) -> Mob {
    Mob::new(EntityId::from_raw(raw), ZONE, Position::new(x, 0.0, z))
}

/// Spawns `mob` at the epoch with a [`FakePath`] installed.
pub(crate) fn spawned(mob: Mob) -> (MobController, Arc<Mutex<PathState>>) {
    let (path, state) = FakePath::new();
    let mut controller = MobController::new(mob.with_pathfinder(Box::new(path)));
    controller.spawn(TickTime::ZERO);
    (controller, state)
}
