//! Movement handle interface.
//!
//! Path planning, line of sight and steering live outside the controller. A
//! [`PathFinder`] is the mob's handle into that subsystem: the controller
//! asks for paths and advances along them, and the world moves the entity.

use crate::flags::RoamFlags;
use bitflags::bitflags;
use mobmind_common::Position;

bitflags! {
    /// Options for path requests.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PathFlags: u8 {
        /// Ignore navmesh walls
        const WALLHACK = 1 << 0;
        /// Move at run speed
        const RUN      = 1 << 1;
        /// Path belongs to a script
        const SCRIPTED = 1 << 2;
    }
}

/// A mob's handle into the pathfinding subsystem.
pub trait PathFinder: Send {
    /// Turns to face `point`.
    fn look_at(&mut self, point: &Position);

    /// Whether a path is being followed.
    fn is_following_path(&self) -> bool;

    /// Whether the current path was set by a script.
    fn is_following_scripted_path(&self) -> bool;

    /// Advances along the current path.
    fn follow_path(&mut self);

    /// Plans a path to `point`. Returns false if none exists.
    fn path_to(&mut self, point: &Position) -> bool;

    /// Plans a path to somewhere within `radius` of `point`.
    fn path_around(&mut self, point: &Position, radius: f32, flags: PathFlags) -> bool;

    /// Plans a wandering path around `origin`.
    fn roam_around(&mut self, origin: &Position, max_distance: f32, turns: u8, flags: RoamFlags) -> bool;

    /// Line of sight to `point`.
    fn can_see_point(&self, point: &Position) -> bool;

    /// Whether the mob stands in water.
    fn in_water(&self) -> bool;

    /// Whether the mob just reached a waypoint.
    fn on_point(&self) -> bool;

    /// Drops the current path.
    fn clear(&mut self);

    /// Truncates the current path to `distance`.
    fn limit_distance(&mut self, distance: f32);
}

/// A handle for mobs that never move. Every plan fails and sight is clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stationary;

impl PathFinder for Stationary {
    fn look_at(&mut self, _point: &Position) {}

    fn is_following_path(&self) -> bool {
        false
    }

    fn is_following_scripted_path(&self) -> bool {
        false
    }

    fn follow_path(&mut self) {}

    fn path_to(&mut self, _point: &Position) -> bool {
        false
    }

    fn path_around(&mut self, _point: &Position, _radius: f32, _flags: PathFlags) -> bool {
        false
    }

    fn roam_around(&mut self, _origin: &Position, _max_distance: f32, _turns: u8, _flags: RoamFlags) -> bool {
        false
    }

    fn can_see_point(&self, _point: &Position) -> bool {
        true
    }

    fn in_water(&self) -> bool {
        false
    }

    fn on_point(&self) -> bool {
        false
    }

    fn clear(&mut self) {}

    fn limit_distance(&mut self, _distance: f32) {}
}
