//! Elapsed-time clock for an active workout session.
//!
//! The timer is a plain state machine over wall-clock timestamps; elapsed time
//! is recomputed from `now` at every observation instead of being advanced by
//! a background tick, so there is nothing to cancel or leak when a page is
//! abandoned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

/// Externally-sourced timer state used for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTimer {
    status: SessionStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Transition to in_progress, recording the start time.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        self.ended_at = None;
    }

    /// Transition to completed, freezing elapsed = end - start.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Completed;
        self.ended_at = Some(now);
    }

    /// Back to idle, clearing both timestamps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Elapsed whole seconds at `now`; frozen once completed, 0 while idle.
    pub fn elapsed(&self, now: DateTime<Utc>) -> i64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = match self.status {
            SessionStatus::Completed => self.ended_at.unwrap_or(now),
            SessionStatus::InProgress => now,
            SessionStatus::Idle => return 0,
        };
        (end - start).num_seconds().max(0)
    }

    /// Idempotent reconciliation against an externally-sourced snapshot.
    ///
    /// A snapshot identical to the current internal state is a no-op, so a
    /// page remount can re-attach to an already-running timer without
    /// restarting it. Otherwise the minimal transition is applied: no start
    /// timestamp means idle; in_progress resumes from the snapshot's start;
    /// completed defaults a missing end timestamp to `now`.
    pub fn sync(&mut self, snapshot: TimerSnapshot, now: DateTime<Utc>) {
        let current = TimerSnapshot {
            status: self.status,
            started_at: self.started_at,
            ended_at: self.ended_at,
        };
        if current == snapshot {
            return;
        }

        match (snapshot.status, snapshot.started_at) {
            (_, None) | (SessionStatus::Idle, _) => self.reset(),
            (SessionStatus::InProgress, Some(start)) => {
                self.status = SessionStatus::InProgress;
                self.started_at = Some(start);
                self.ended_at = None;
            }
            (SessionStatus::Completed, Some(start)) => {
                self.status = SessionStatus::Completed;
                self.started_at = Some(start);
                self.ended_at = Some(snapshot.ended_at.unwrap_or(now));
            }
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}
