//! State machine driving the interactive execution of one workout.
//!
//! `ActiveSession` is pure: it owns the timer, per-exercise progress, weight
//! overrides and rest countdowns, and exposes transitions for every user
//! action. Handlers hydrate it from the persisted snapshot, apply one
//! transition, and write the snapshot back. Set completion is two-phase:
//! `begin_set` applies the optimistic increment, then either `commit_set`
//! (after the log row is inserted) or `rollback_set` (when the insert fails)
//! settles it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::set_plan::{self, SetPlanEntry};
use crate::models::Exercise;

use super::snapshot::{RestTimer, SessionSnapshot, SNAPSHOT_VERSION};
use super::timer::{SessionStatus, SessionTimer, TimerSnapshot};

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("Session is not in progress")]
    NotInProgress,

    #[error("Unknown exercise")]
    UnknownExercise,

    #[error("Exercise already finished")]
    ExerciseFinished,

    #[error("{remaining_sets} sets across {remaining_exercises} exercises remain")]
    ConfirmationRequired {
        remaining_sets: i64,
        remaining_exercises: i64,
    },
}

/// One exercise as the running session sees it. When a set plan is present its
/// length is the authoritative set count for execution.
#[derive(Debug, Clone)]
pub struct SessionExercise {
    pub id: String,
    pub name: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub rest_seconds: i64,
    pub order_index: i64,
    pub plan: Vec<SetPlanEntry>,
}

impl From<&Exercise> for SessionExercise {
    fn from(ex: &Exercise) -> Self {
        let plan = ex.plan();
        let sets = if plan.is_empty() {
            ex.sets.max(1)
        } else {
            plan.len() as i64
        };
        Self {
            id: ex.id.clone(),
            name: ex.name.clone(),
            sets,
            reps: ex.reps,
            weight: ex.weight,
            rest_seconds: ex.rest_seconds,
            order_index: ex.order_index,
            plan,
        }
    }
}

/// Resolved target for one set about to be logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedSet {
    /// 1-based index of the set being completed.
    pub set_index: i64,
    pub reps: i64,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub workout_id: String,
    pub user_id: String,
    timer: SessionTimer,
    exercises: Vec<SessionExercise>,
    progress: BTreeMap<String, i64>,
    weight_overrides: BTreeMap<String, f64>,
    rest_timers: BTreeMap<String, RestTimer>,
    /// Single-flight guard: exercises with a set completion mid-save.
    pending: BTreeSet<String>,
    volume: f64,
    focused: Option<String>,
}

impl ActiveSession {
    pub fn new(workout_id: &str, user_id: &str, mut exercises: Vec<SessionExercise>) -> Self {
        exercises.sort_by_key(|e| e.order_index);

        let progress = exercises.iter().map(|e| (e.id.clone(), 0)).collect();
        let rest_timers = exercises
            .iter()
            .map(|e| (e.id.clone(), RestTimer::new(e.rest_seconds)))
            .collect();

        Self {
            workout_id: workout_id.to_string(),
            user_id: user_id.to_string(),
            timer: SessionTimer::new(),
            exercises,
            progress,
            weight_overrides: BTreeMap::new(),
            rest_timers,
            pending: BTreeSet::new(),
            volume: 0.0,
            focused: None,
        }
    }

    /// Rebuild a session from a persisted snapshot.
    ///
    /// Progress counts are clamped to each exercise's set count, invalid
    /// weight overrides are dropped (resolution falls back to the plan entry
    /// or exercise default), and active rest timers catch up on the wall-clock
    /// time that passed while the session was unattended.
    pub fn hydrate(
        workout_id: &str,
        user_id: &str,
        exercises: Vec<SessionExercise>,
        snapshot: &SessionSnapshot,
        initial_volume: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let mut session = Self::new(workout_id, user_id, exercises);
        session.volume = initial_volume;

        for ex in &session.exercises {
            if let Some(&count) = snapshot.progress.get(&ex.id) {
                session
                    .progress
                    .insert(ex.id.clone(), count.clamp(0, ex.sets));
            }
            if let Some(&weight) = snapshot.weight_overrides.get(&ex.id) {
                if weight.is_finite() && weight >= 0.0 {
                    session.weight_overrides.insert(ex.id.clone(), weight);
                }
            }
            if let Some(&rest) = snapshot.rest_timers.get(&ex.id) {
                let mut timer = RestTimer {
                    duration: ex.rest_seconds,
                    remaining: rest.remaining.clamp(0, ex.rest_seconds),
                    active: rest.active,
                };
                // Unattended catch-up, then re-establish the zero/inactive
                // invariant.
                let unattended = (now - snapshot.last_updated).num_seconds();
                timer.tick(unattended);
                if timer.remaining == 0 {
                    timer.active = false;
                }
                session.rest_timers.insert(ex.id.clone(), timer);
            }
        }

        session.timer.sync(
            TimerSnapshot {
                status: snapshot.status,
                started_at: snapshot.started_at,
                ended_at: snapshot.ended_at,
            },
            now,
        );

        if let Some(id) = &snapshot.focused_exercise_id {
            if session.exercise(id).is_some() {
                session.focused = Some(id.clone());
            }
        }

        session
    }

    pub fn serialize(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            workout_id: self.workout_id.clone(),
            user_id: self.user_id.clone(),
            status: self.timer.status(),
            started_at: self.timer.started_at(),
            ended_at: self.timer.ended_at(),
            progress: self.progress.clone(),
            weight_overrides: self.weight_overrides.clone(),
            rest_timers: self.rest_timers.clone(),
            focused_exercise_id: self.focused.clone(),
            last_updated: now,
        }
    }

    // Accessors

    pub fn status(&self) -> SessionStatus {
        self.timer.status()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.timer.started_at()
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> i64 {
        self.timer.elapsed(now)
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    pub fn exercise(&self, id: &str) -> Option<&SessionExercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn completed_sets(&self, id: &str) -> i64 {
        self.progress.get(id).copied().unwrap_or(0)
    }

    pub fn rest_timer(&self, id: &str) -> Option<&RestTimer> {
        self.rest_timers.get(id)
    }

    pub fn is_exercise_finished(&self, id: &str) -> bool {
        match self.exercise(id) {
            Some(ex) => self.completed_sets(id) >= ex.sets,
            None => false,
        }
    }

    pub fn workout_finished(&self) -> bool {
        self.exercises
            .iter()
            .all(|ex| self.completed_sets(&ex.id) >= ex.sets)
    }

    /// Remaining (sets, exercises) used in the early-finalize confirmation.
    pub fn remaining(&self) -> (i64, i64) {
        let mut sets = 0;
        let mut exercises = 0;
        for ex in &self.exercises {
            let left = ex.sets - self.completed_sets(&ex.id);
            if left > 0 {
                sets += left;
                exercises += 1;
            }
        }
        (sets, exercises)
    }

    /// The exercise the UI is centered on: the explicit selection while it
    /// still has sets left, otherwise the first unfinished exercise in
    /// order_index order.
    pub fn focused_exercise(&self) -> Option<&SessionExercise> {
        if let Some(id) = &self.focused {
            if !self.is_exercise_finished(id) {
                return self.exercise(id);
            }
        }
        self.exercises
            .iter()
            .find(|ex| self.completed_sets(&ex.id) < ex.sets)
    }

    /// Weight the next set of this exercise will be logged at.
    pub fn current_weight(&self, id: &str) -> f64 {
        if let Some(&w) = self.weight_overrides.get(id) {
            return w;
        }
        let Some(ex) = self.exercise(id) else { return 0.0 };
        let next_set = self.completed_sets(id) + 1;
        set_plan::entry_for_set(&ex.plan, next_set)
            .and_then(|e| e.weight)
            .unwrap_or(ex.weight)
    }

    /// Overrides that differ from the exercise's stored default, persisted
    /// best-effort on finalize.
    pub fn changed_overrides(&self) -> Vec<(String, f64)> {
        self.weight_overrides
            .iter()
            .filter(|(id, &w)| self.exercise(id).map(|ex| ex.weight != w).unwrap_or(false))
            .map(|(id, &w)| (id.clone(), w))
            .collect()
    }

    // Transitions

    /// Begin a session. A no-op while one is already running; starting over
    /// a completed or idle session resets all counters and timers.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.timer.status() == SessionStatus::InProgress {
            return;
        }
        for count in self.progress.values_mut() {
            *count = 0;
        }
        self.rest_timers = self
            .exercises
            .iter()
            .map(|e| (e.id.clone(), RestTimer::new(e.rest_seconds)))
            .collect();
        self.weight_overrides.clear();
        self.pending.clear();
        self.volume = 0.0;
        self.focused = None;
        self.timer.start(now);
    }

    /// Phase one of completing a set: validate, apply the optimistic
    /// increment, and resolve the target reps/weight for the log row.
    ///
    /// Returns `Ok(None)` when the attempt is silently ignored (exercise at
    /// capacity, or a save for it is already in flight).
    pub fn begin_set(&mut self, exercise_id: &str) -> Result<Option<PlannedSet>, SessionError> {
        if self.timer.status() != SessionStatus::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let ex = self
            .exercise(exercise_id)
            .ok_or(SessionError::UnknownExercise)?
            .clone();

        let done = self.completed_sets(exercise_id);
        if done >= ex.sets || self.pending.contains(exercise_id) {
            return Ok(None);
        }

        let set_index = done + 1;
        let entry = set_plan::entry_for_set(&ex.plan, set_index);
        let reps = entry.and_then(|e| e.reps).unwrap_or(ex.reps);
        let weight = match self.weight_overrides.get(exercise_id) {
            Some(&w) => w,
            None => entry.and_then(|e| e.weight).unwrap_or(ex.weight),
        };

        self.progress.insert(exercise_id.to_string(), set_index);
        self.pending.insert(exercise_id.to_string());

        Ok(Some(PlannedSet {
            set_index,
            reps,
            weight,
        }))
    }

    /// Phase two, success path: account the volume and drive the rest timer.
    /// More sets remaining restarts the countdown and promotes the next plan
    /// weight to the active override; the last set stops the countdown.
    pub fn commit_set(&mut self, exercise_id: &str, planned: &PlannedSet) {
        self.pending.remove(exercise_id);

        let Some(ex) = self.exercise(exercise_id).cloned() else {
            return;
        };

        self.volume += planned.weight * planned.reps as f64;

        let done = self.completed_sets(exercise_id);
        if done < ex.sets {
            if let Some(timer) = self.rest_timers.get_mut(exercise_id) {
                timer.restart();
            }
            if let Some(next_weight) =
                set_plan::entry_for_set(&ex.plan, done + 1).and_then(|e| e.weight)
            {
                self.weight_overrides
                    .insert(exercise_id.to_string(), next_weight);
            }
        } else if let Some(timer) = self.rest_timers.get_mut(exercise_id) {
            timer.stop();
        }
    }

    /// Phase two, failure path: compensate the optimistic increment.
    pub fn rollback_set(&mut self, exercise_id: &str) {
        self.pending.remove(exercise_id);
        let done = self.completed_sets(exercise_id);
        self.progress
            .insert(exercise_id.to_string(), (done - 1).max(0));
    }

    /// Advance every active rest countdown by `elapsed` wall-clock seconds.
    pub fn tick(&mut self, elapsed: i64) {
        for timer in self.rest_timers.values_mut() {
            timer.tick(elapsed);
        }
    }

    pub fn select_exercise(&mut self, exercise_id: &str) -> Result<(), SessionError> {
        if self.exercise(exercise_id).is_none() {
            return Err(SessionError::UnknownExercise);
        }
        if self.is_exercise_finished(exercise_id) {
            return Err(SessionError::ExerciseFinished);
        }
        self.focused = Some(exercise_id.to_string());
        Ok(())
    }

    pub fn set_weight_override(&mut self, exercise_id: &str, weight: f64) -> Result<(), SessionError> {
        if self.exercise(exercise_id).is_none() {
            return Err(SessionError::UnknownExercise);
        }
        if weight.is_finite() && weight >= 0.0 {
            self.weight_overrides
                .insert(exercise_id.to_string(), weight);
        }
        Ok(())
    }

    /// Finalize the session. Finishing early (sets remaining) requires
    /// explicit confirmation; the error carries the remaining counts for the
    /// prompt.
    pub fn finish(&mut self, now: DateTime<Utc>, confirmed: bool) -> Result<(), SessionError> {
        if self.timer.status() != SessionStatus::InProgress {
            return Err(SessionError::NotInProgress);
        }
        if !self.workout_finished() && !confirmed {
            let (remaining_sets, remaining_exercises) = self.remaining();
            return Err(SessionError::ConfirmationRequired {
                remaining_sets,
                remaining_exercises,
            });
        }
        self.timer.finish(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2025-06-01T10:00:00Z".parse().unwrap()
    }

    fn exercise(id: &str, sets: i64, reps: i64, weight: f64, rest: i64, order: i64) -> SessionExercise {
        SessionExercise {
            id: id.to_string(),
            name: format!("Exercise {}", id),
            sets,
            reps,
            weight,
            rest_seconds: rest,
            order_index: order,
            plan: Vec::new(),
        }
    }

    fn started_session(exercises: Vec<SessionExercise>) -> ActiveSession {
        let mut session = ActiveSession::new("w1", "u1", exercises);
        session.start(t0());
        session
    }

    fn complete(session: &mut ActiveSession, id: &str) -> PlannedSet {
        let planned = session.begin_set(id).unwrap().unwrap();
        session.commit_set(id, &planned);
        planned
    }

    #[test]
    fn test_complete_set_requires_in_progress() {
        let mut session = ActiveSession::new("w1", "u1", vec![exercise("a", 3, 10, 50.0, 60, 0)]);

        let result = session.begin_set("a");

        assert_eq!(result, Err(SessionError::NotInProgress));
        assert_eq!(session.completed_sets("a"), 0);
    }

    #[test]
    fn test_completed_count_never_exceeds_sets() {
        let mut session = started_session(vec![exercise("a", 2, 10, 50.0, 60, 0)]);

        complete(&mut session, "a");
        complete(&mut session, "a");
        // Third attempt is silently ignored
        assert_eq!(session.begin_set("a").unwrap(), None);
        assert_eq!(session.completed_sets("a"), 2);
    }

    #[test]
    fn test_single_flight_guard_per_exercise() {
        let mut session = started_session(vec![
            exercise("a", 3, 10, 50.0, 60, 0),
            exercise("b", 3, 10, 50.0, 60, 1),
        ]);

        let planned = session.begin_set("a").unwrap().unwrap();
        // Duplicate submit for the same exercise while the save is pending
        assert_eq!(session.begin_set("a").unwrap(), None);
        // A different exercise is unaffected
        assert!(session.begin_set("b").unwrap().is_some());

        session.commit_set("a", &planned);
        assert!(session.begin_set("a").unwrap().is_some());
    }

    #[test]
    fn test_rollback_compensates_increment() {
        let mut session = started_session(vec![exercise("a", 3, 10, 50.0, 60, 0)]);

        session.begin_set("a").unwrap().unwrap();
        assert_eq!(session.completed_sets("a"), 1);

        session.rollback_set("a");
        assert_eq!(session.completed_sets("a"), 0);
        assert_eq!(session.volume(), 0.0);
        // Retry works after rollback
        assert!(session.begin_set("a").unwrap().is_some());
    }

    #[test]
    fn test_volume_accumulates_weight_times_reps() {
        let mut session = started_session(vec![exercise("a", 2, 10, 50.0, 60, 0)]);

        complete(&mut session, "a");
        complete(&mut session, "a");

        assert_eq!(session.volume(), 1000.0);
    }

    #[test]
    fn test_rest_timer_scenario_three_sets() {
        // sets=3, rest=60: completing set 1 arms the timer at 60; after 60
        // ticks it expires; the last set leaves it inactive at full duration.
        let mut session = started_session(vec![exercise("a", 3, 10, 50.0, 60, 0)]);

        complete(&mut session, "a");
        let rest = session.rest_timer("a").unwrap();
        assert!(rest.active);
        assert_eq!(rest.remaining, 60);

        session.tick(60);
        let rest = session.rest_timer("a").unwrap();
        assert!(!rest.active);
        assert_eq!(rest.remaining, 0);

        complete(&mut session, "a");
        complete(&mut session, "a");
        let rest = session.rest_timer("a").unwrap();
        assert!(!rest.active);
        assert_eq!(rest.remaining, 60);
    }

    #[test]
    fn test_plan_overrides_reps_weight_and_set_count() {
        let mut ex = exercise("a", 1, 10, 50.0, 60, 0);
        ex.plan = vec![
            SetPlanEntry { set: 1, reps: Some(12), weight: Some(40.0) },
            SetPlanEntry { set: 2, reps: Some(8), weight: Some(60.0) },
        ];
        // Plan length wins over the scalar sets field
        let mut session = started_session(vec![ex]);
        assert_eq!(session.exercise("a").unwrap().sets, 2);

        let first = complete(&mut session, "a");
        assert_eq!(first.reps, 12);
        assert_eq!(first.weight, 40.0);

        // The next set's plan weight became the active override
        assert_eq!(session.current_weight("a"), 60.0);

        let second = complete(&mut session, "a");
        assert_eq!(second.reps, 8);
        assert_eq!(second.weight, 60.0);
        assert_eq!(session.volume(), 12.0 * 40.0 + 8.0 * 60.0);
    }

    #[test]
    fn test_explicit_override_beats_plan_weight() {
        let mut ex = exercise("a", 2, 10, 50.0, 60, 0);
        ex.plan = vec![SetPlanEntry { set: 1, reps: None, weight: Some(40.0) }];
        let mut session = started_session(vec![ex]);

        session.set_weight_override("a", 45.0).unwrap();
        let planned = session.begin_set("a").unwrap().unwrap();

        assert_eq!(planned.weight, 45.0);
    }

    #[test]
    fn test_focused_defaults_to_first_unfinished_in_order() {
        let mut session = started_session(vec![
            exercise("b", 1, 10, 50.0, 60, 1),
            exercise("a", 1, 10, 50.0, 60, 0),
        ]);

        assert_eq!(session.focused_exercise().unwrap().id, "a");

        complete(&mut session, "a");
        assert_eq!(session.focused_exercise().unwrap().id, "b");
    }

    #[test]
    fn test_selecting_finished_exercise_is_rejected() {
        let mut session = started_session(vec![
            exercise("a", 1, 10, 50.0, 60, 0),
            exercise("b", 1, 10, 50.0, 60, 1),
        ]);
        complete(&mut session, "a");

        assert_eq!(
            session.select_exercise("a"),
            Err(SessionError::ExerciseFinished)
        );
        assert!(session.select_exercise("b").is_ok());
        assert_eq!(session.focused_exercise().unwrap().id, "b");
    }

    #[test]
    fn test_workout_finished_after_all_sets() {
        let mut session = started_session(vec![
            exercise("a", 2, 10, 50.0, 60, 0),
            exercise("b", 2, 10, 50.0, 60, 1),
        ]);

        for _ in 0..2 {
            complete(&mut session, "a");
            complete(&mut session, "b");
        }

        assert!(session.workout_finished());
        // No confirmation needed once everything is done
        assert!(session.finish(t0() + Duration::seconds(600), false).is_ok());
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_early_finish_requires_confirmation() {
        let mut session = started_session(vec![
            exercise("a", 2, 10, 50.0, 60, 0),
            exercise("b", 2, 10, 50.0, 60, 1),
        ]);
        complete(&mut session, "a");

        let err = session.finish(t0(), false).unwrap_err();
        assert_eq!(
            err,
            SessionError::ConfirmationRequired {
                remaining_sets: 3,
                remaining_exercises: 2,
            }
        );
        assert_eq!(session.status(), SessionStatus::InProgress);

        assert!(session.finish(t0(), true).is_ok());
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_snapshot_round_trip_reproduces_state() {
        let mut ex = exercise("a", 3, 10, 50.0, 60, 0);
        ex.plan = vec![SetPlanEntry { set: 2, reps: None, weight: Some(55.0) }];
        let exercises = vec![ex, exercise("b", 2, 8, 30.0, 90, 1)];

        let mut session = started_session(exercises.clone());
        complete(&mut session, "a");
        session.set_weight_override("b", 32.5).unwrap();
        session.select_exercise("b").unwrap();

        let now = t0() + Duration::seconds(120);
        let snapshot = session.serialize(now);

        // Zero elapsed wall-clock time between serialize and hydrate
        let restored =
            ActiveSession::hydrate("w1", "u1", exercises, &snapshot, session.volume(), now);

        assert_eq!(restored.status(), SessionStatus::InProgress);
        assert_eq!(restored.completed_sets("a"), 1);
        assert_eq!(restored.completed_sets("b"), 0);
        assert_eq!(restored.current_weight("b"), 32.5);
        assert_eq!(restored.rest_timer("a"), session.rest_timer("a"));
        assert_eq!(restored.focused_exercise().unwrap().id, "b");
        assert_eq!(restored.elapsed(now), session.elapsed(now));
    }

    #[test]
    fn test_hydrate_applies_unattended_catch_up() {
        let mut session = started_session(vec![exercise("a", 3, 10, 50.0, 60, 0)]);
        complete(&mut session, "a");

        let saved_at = t0() + Duration::seconds(10);
        let snapshot = session.serialize(saved_at);

        // 45 seconds pass while nothing is mounted
        let later = saved_at + Duration::seconds(45);
        let restored = ActiveSession::hydrate(
            "w1",
            "u1",
            vec![exercise("a", 3, 10, 50.0, 60, 0)],
            &snapshot,
            0.0,
            later,
        );

        let rest = restored.rest_timer("a").unwrap();
        assert!(rest.active);
        assert_eq!(rest.remaining, 15);

        // And far enough in the future the timer has fully expired
        let much_later = saved_at + Duration::seconds(600);
        let expired = ActiveSession::hydrate(
            "w1",
            "u1",
            vec![exercise("a", 3, 10, 50.0, 60, 0)],
            &snapshot,
            0.0,
            much_later,
        );
        let rest = expired.rest_timer("a").unwrap();
        assert!(!rest.active);
        assert_eq!(rest.remaining, 0);
    }

    #[test]
    fn test_hydrate_clamps_progress_to_set_count() {
        let mut session = started_session(vec![exercise("a", 5, 10, 50.0, 60, 0)]);
        complete(&mut session, "a");
        complete(&mut session, "a");
        complete(&mut session, "a");
        let snapshot = session.serialize(t0());

        // The workout was edited down to 2 sets since the snapshot was taken
        let restored = ActiveSession::hydrate(
            "w1",
            "u1",
            vec![exercise("a", 2, 10, 50.0, 60, 0)],
            &snapshot,
            0.0,
            t0(),
        );

        assert_eq!(restored.completed_sets("a"), 2);
        assert!(restored.is_exercise_finished("a"));
    }

    #[test]
    fn test_hydrate_drops_invalid_weight_override() {
        let session = started_session(vec![exercise("a", 3, 10, 50.0, 60, 0)]);
        let mut snapshot = session.serialize(t0());
        snapshot.weight_overrides.insert("a".to_string(), f64::NAN);

        let restored = ActiveSession::hydrate(
            "w1",
            "u1",
            vec![exercise("a", 3, 10, 50.0, 60, 0)],
            &snapshot,
            0.0,
            t0(),
        );

        // Falls back to the exercise default
        assert_eq!(restored.current_weight("a"), 50.0);
    }

    #[test]
    fn test_changed_overrides_only_reports_differences() {
        let mut session = started_session(vec![
            exercise("a", 3, 10, 50.0, 60, 0),
            exercise("b", 3, 10, 30.0, 60, 1),
        ]);
        session.set_weight_override("a", 50.0).unwrap(); // same as default
        session.set_weight_override("b", 35.0).unwrap();

        assert_eq!(session.changed_overrides(), vec![("b".to_string(), 35.0)]);
    }

    #[test]
    fn test_finish_when_not_started_is_rejected() {
        let mut session = ActiveSession::new("w1", "u1", vec![exercise("a", 1, 10, 50.0, 60, 0)]);
        assert_eq!(session.finish(t0(), true), Err(SessionError::NotInProgress));
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut session = started_session(vec![exercise("a", 2, 10, 50.0, 60, 0)]);
        let planned = session.begin_set("a").unwrap().unwrap();
        session.commit_set("a", &planned);

        session.start(t0() + Duration::seconds(30));

        assert_eq!(session.completed_sets("a"), 1);
        assert_eq!(session.started_at(), Some(t0()));
    }

    #[test]
    fn test_restart_after_completion_resets_counters() {
        let mut session = started_session(vec![exercise("a", 1, 10, 50.0, 60, 0)]);
        let planned = session.begin_set("a").unwrap().unwrap();
        session.commit_set("a", &planned);
        session.finish(t0() + Duration::seconds(100), false).unwrap();

        let later = t0() + Duration::seconds(500);
        session.start(later);

        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.started_at(), Some(later));
        assert_eq!(session.completed_sets("a"), 0);
        assert_eq!(session.volume(), 0.0);
    }
}
