//! Cooldown bookkeeping.

use mobmind_common::TickTime;
use std::time::Duration;

/// Last-use timestamp of one action family.
///
/// `credit` shortens the next cooldown; it lets an action become ready
/// earlier without moving the timestamp backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cooldown {
    last: Option<TickTime>,
    credit: Duration,
}

impl Cooldown {
    /// When the action last fired.
    #[must_use]
    pub const fn last(&self) -> Option<TickTime> {
        self.last
    }

    /// Earliest time the action may fire again. A family that never fired
    /// is ready at the epoch.
    #[must_use]
    pub fn ready_at(&self, cooldown: Duration) -> TickTime {
        match self.last {
            Some(last) => last + cooldown.saturating_sub(self.credit),
            None => TickTime::ZERO,
        }
    }

    /// Whether the cooldown has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: TickTime, cooldown: Duration) -> bool {
        now >= self.ready_at(cooldown)
    }

    /// Records a use at `now`. Never moves the timestamp backwards.
    pub fn stamp(&mut self, now: TickTime) {
        self.last = Some(self.last.map_or(now, |last| last.max(now)));
        self.credit = Duration::ZERO;
    }

    /// Records a use at `now` and shortens the next cooldown by `credit`.
    pub fn stamp_with_credit(&mut self, now: TickTime, credit: Duration) {
        self.stamp(now);
        self.credit = credit;
    }
}

/// Every timer a controller keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    /// Melee swings and skill-based auto-attacks
    pub attack: Cooldown,
    /// Special skill and pre-combat teleport
    pub special: Cooldown,
    /// Spell casts
    pub magic: Cooldown,
    /// Mob skills
    pub mob_skill: Cooldown,
    /// Roam actions
    pub roam: Cooldown,
    /// Ambient roam hook
    pub roam_script: Cooldown,
    /// Start of the current neutral grace window
    pub neutral_since: Option<TickTime>,
    /// Roaming is suspended until this time
    pub wait_until: TickTime,
}

impl Timers {
    /// Suspends roaming for `duration`. An active wait is extended; an
    /// expired one restarts from `now`.
    pub fn wait(&mut self, now: TickTime, duration: Duration) {
        if self.wait_until > now {
            self.wait_until += duration;
        } else {
            self.wait_until = now + duration;
        }
    }

    /// Whether any wait has expired at `now`.
    #[must_use]
    pub fn wait_elapsed(&self, now: TickTime) -> bool {
        now >= self.wait_until
    }

    /// Whether `now` falls inside the neutral grace window.
    #[must_use]
    pub fn in_neutral_window(&self, now: TickTime, window: Duration) -> bool {
        self.neutral_since.is_some_and(|since| now <= since + window)
    }
}
