//! Serialized form of an in-progress session.
//!
//! The snapshot is the write-ahead record for a running session: overwritten
//! on every state change, read back once when the session page is opened, and
//! deleted on finalize or abandonment. The explicit version tag lets future
//! schema changes discard incompatible rows instead of misreading them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timer::SessionStatus;

/// Bump when the snapshot layout changes; mismatched rows are discarded.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Countdown state for one exercise's rest interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RestTimer {
    /// Configured rest length in seconds.
    pub duration: i64,
    pub remaining: i64,
    pub active: bool,
}

impl RestTimer {
    pub fn new(duration: i64) -> Self {
        Self {
            duration,
            remaining: duration,
            active: false,
        }
    }

    /// (Re)start the countdown from the full configured duration.
    pub fn restart(&mut self) {
        self.remaining = self.duration;
        self.active = self.duration > 0;
    }

    /// Stop counting and reset to the full duration (not "resting").
    pub fn stop(&mut self) {
        self.remaining = self.duration;
        self.active = false;
    }

    /// Advance the countdown by `elapsed` seconds of wall-clock time.
    /// Invariant: a timer with zero remaining is never active.
    pub fn tick(&mut self, elapsed: i64) {
        if !self.active {
            return;
        }
        self.remaining = (self.remaining - elapsed.max(0)).max(0);
        if self.remaining == 0 {
            self.active = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub workout_id: String,
    pub user_id: String,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Completed-set counts keyed by exercise id.
    pub progress: BTreeMap<String, i64>,
    /// Active weight overrides keyed by exercise id.
    pub weight_overrides: BTreeMap<String, f64>,
    pub rest_timers: BTreeMap<String, RestTimer>,
    pub focused_exercise_id: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Storage key for one user+workout pair; also the prefix used when scanning
/// a user's snapshots for a resumable session.
pub fn snapshot_key(user_id: &str, workout_id: &str) -> String {
    format!("session:{}:{}", user_id, workout_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_timer_restart_and_tick() {
        let mut timer = RestTimer::new(60);
        assert!(!timer.active);

        timer.restart();
        assert!(timer.active);
        assert_eq!(timer.remaining, 60);

        timer.tick(25);
        assert_eq!(timer.remaining, 35);
        assert!(timer.active);
    }

    #[test]
    fn test_rest_timer_expires_at_zero() {
        let mut timer = RestTimer::new(60);
        timer.restart();
        timer.tick(60);

        assert_eq!(timer.remaining, 0);
        assert!(!timer.active);
    }

    #[test]
    fn test_rest_timer_overshoot_clamps_to_zero() {
        let mut timer = RestTimer::new(30);
        timer.restart();
        timer.tick(500);

        assert_eq!(timer.remaining, 0);
        assert!(!timer.active);
    }

    #[test]
    fn test_rest_timer_stop_resets_to_full_duration() {
        let mut timer = RestTimer::new(90);
        timer.restart();
        timer.tick(10);
        timer.stop();

        assert_eq!(timer.remaining, 90);
        assert!(!timer.active);
    }

    #[test]
    fn test_inactive_timer_ignores_ticks() {
        let mut timer = RestTimer::new(60);
        timer.tick(30);
        assert_eq!(timer.remaining, 60);
    }

    #[test]
    fn test_zero_duration_timer_never_activates() {
        let mut timer = RestTimer::new(0);
        timer.restart();
        assert!(!timer.active);
        assert_eq!(timer.remaining, 0);
    }

    #[test]
    fn test_snapshot_key_is_prefix_scannable() {
        let key = snapshot_key("user-1", "workout-9");
        assert_eq!(key, "session:user-1:workout-9");
        assert!(key.starts_with("session:user-1:"));
    }
}
