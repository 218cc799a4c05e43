use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::Workout;
use crate::repositories::{
    ExerciseRepository, LogRepository, SnapshotRepository, WorkoutRepository,
};
use crate::session::{ActiveSession, SessionError, SessionExercise, SessionStatus};

#[derive(Clone)]
pub struct SessionRunState {
    pub workout_repo: WorkoutRepository,
    pub exercise_repo: ExerciseRepository,
    pub log_repo: LogRepository,
    pub snapshot_repo: SnapshotRepository,
}

// Templates

struct ExerciseRow {
    id: String,
    name: String,
    completed: i64,
    sets: i64,
    reps: i64,
    current_weight: f64,
    rest_remaining: i64,
    rest_active: bool,
    finished: bool,
    focused: bool,
}

#[derive(Template)]
#[template(path = "session/run.html")]
struct RunTemplate {
    user: AuthUser,
    workout: Workout,
    status: &'static str,
    in_progress: bool,
    completed: bool,
    elapsed: String,
    volume: f64,
    rows: Vec<ExerciseRow>,
    workout_finished: bool,
    confirm: bool,
    remaining_sets: i64,
    remaining_exercises: i64,
    error: Option<&'static str>,
}

fn format_elapsed(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        "save_failed" => Some("Couldn't save that set. Tap it again to retry."),
        "not_in_progress" => Some("Start the session before logging sets."),
        "finished" => Some("That exercise is already done."),
        _ => None,
    }
}

impl SessionRunState {
    /// Load the workout and rebuild its session: from the persisted snapshot
    /// when one survives validation, fresh (idle) otherwise.
    async fn load(
        &self,
        user_id: &str,
        workout_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Workout, ActiveSession)> {
        let workout = self.workout_repo.find_owned(workout_id, user_id).await?;
        let exercises: Vec<SessionExercise> = self
            .exercise_repo
            .find_by_workout(workout_id)
            .await?
            .iter()
            .map(SessionExercise::from)
            .collect();

        let session = match self.snapshot_repo.load(user_id, workout_id).await? {
            Some(snapshot) => {
                // The session's running volume counter is rebuilt from the
                // append-only log rather than trusted from the snapshot.
                let volume = match snapshot.started_at {
                    Some(started_at) => self
                        .log_repo
                        .volume_for_workout_since(user_id, workout_id, started_at)
                        .await
                        .unwrap_or(0.0),
                    None => 0.0,
                };
                ActiveSession::hydrate(workout_id, user_id, exercises, &snapshot, volume, now)
            }
            None => ActiveSession::new(workout_id, user_id, exercises),
        };

        Ok((workout, session))
    }

    /// Overwrite the persisted snapshot, best-effort, once the session has a
    /// start timestamp.
    async fn persist(&self, session: &ActiveSession, now: DateTime<Utc>) {
        if session.started_at().is_some() {
            self.snapshot_repo.save_best_effort(&session.serialize(now)).await;
        }
    }
}

#[derive(Deserialize)]
pub struct RunQuery {
    confirm: Option<u8>,
    error: Option<String>,
}

pub async fn show(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
    Query(query): Query<RunQuery>,
) -> Result<Response> {
    let now = Utc::now();
    let (workout, session) = state.load(&auth_user.id, &workout_id, now).await?;

    let focused_id = session.focused_exercise().map(|e| e.id.clone());
    let rows = session
        .exercises()
        .iter()
        .map(|ex| {
            let rest = session.rest_timer(&ex.id).copied().unwrap_or_default();
            ExerciseRow {
                id: ex.id.clone(),
                name: ex.name.clone(),
                completed: session.completed_sets(&ex.id),
                sets: ex.sets,
                reps: ex.reps,
                current_weight: session.current_weight(&ex.id),
                rest_remaining: rest.remaining,
                rest_active: rest.active,
                finished: session.is_exercise_finished(&ex.id),
                focused: focused_id.as_deref() == Some(ex.id.as_str()),
            }
        })
        .collect();

    let (remaining_sets, remaining_exercises) = session.remaining();
    let status = session.status();

    let template = RunTemplate {
        user: auth_user,
        workout,
        status: status.as_str(),
        in_progress: status == SessionStatus::InProgress,
        completed: status == SessionStatus::Completed,
        elapsed: format_elapsed(session.elapsed(now)),
        volume: session.volume(),
        rows,
        workout_finished: session.workout_finished(),
        confirm: query.confirm == Some(1),
        remaining_sets,
        remaining_exercises,
        error: query.error.as_deref().and_then(flash_message),
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn start(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
) -> Result<Response> {
    let now = Utc::now();
    let (_, mut session) = state.load(&auth_user.id, &workout_id, now).await?;

    // Re-attaching to a running session is a no-op; restarting a completed
    // one begins a fresh session.
    if session.status() != SessionStatus::InProgress {
        session.start(now);
        state.persist(&session, now).await;
    }

    Ok(Redirect::to(&format!("/workouts/{}/session", workout_id)).into_response())
}

#[derive(Deserialize)]
pub struct CompleteForm {
    pub exercise_id: String,
}

pub async fn complete_set(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
    Form(form): Form<CompleteForm>,
) -> Result<Response> {
    let now = Utc::now();
    let (_, mut session) = state.load(&auth_user.id, &workout_id, now).await?;
    let page = format!("/workouts/{}/session", workout_id);

    let planned = match session.begin_set(&form.exercise_id) {
        Ok(Some(planned)) => planned,
        // Capacity reached or save already pending: silently ignored
        Ok(None) => return Ok(Redirect::to(&page).into_response()),
        Err(SessionError::NotInProgress) => {
            return Ok(Redirect::to(&format!("{}?error=not_in_progress", page)).into_response())
        }
        Err(SessionError::UnknownExercise) => {
            return Err(AppError::NotFound("Exercise not found".to_string()))
        }
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    };

    // Two-phase local commit: the optimistic increment is already applied;
    // the log append decides whether it sticks.
    match state
        .log_repo
        .append(&form.exercise_id, &auth_user.id, planned.weight, planned.reps, now)
        .await
    {
        Ok(_) => {
            session.commit_set(&form.exercise_id, &planned);
            state.persist(&session, now).await;
            Ok(Redirect::to(&page).into_response())
        }
        Err(e) => {
            tracing::error!("Failed to log set: {}", e);
            session.rollback_set(&form.exercise_id);
            state.persist(&session, now).await;
            Ok(Redirect::to(&format!("{}?error=save_failed", page)).into_response())
        }
    }
}

#[derive(Deserialize)]
pub struct SelectForm {
    pub exercise_id: String,
}

pub async fn select_exercise(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
    Form(form): Form<SelectForm>,
) -> Result<Response> {
    let now = Utc::now();
    let (_, mut session) = state.load(&auth_user.id, &workout_id, now).await?;
    let page = format!("/workouts/{}/session", workout_id);

    match session.select_exercise(&form.exercise_id) {
        Ok(()) => {
            state.persist(&session, now).await;
            Ok(Redirect::to(&page).into_response())
        }
        Err(SessionError::ExerciseFinished) => {
            Ok(Redirect::to(&format!("{}?error=finished", page)).into_response())
        }
        Err(_) => Err(AppError::NotFound("Exercise not found".to_string())),
    }
}

#[derive(Deserialize)]
pub struct WeightForm {
    pub exercise_id: String,
    pub weight: f64,
}

pub async fn set_weight(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
    Form(form): Form<WeightForm>,
) -> Result<Response> {
    let now = Utc::now();
    let (_, mut session) = state.load(&auth_user.id, &workout_id, now).await?;

    session
        .set_weight_override(&form.exercise_id, form.weight)
        .map_err(|_| AppError::NotFound("Exercise not found".to_string()))?;
    state.persist(&session, now).await;

    Ok(Redirect::to(&format!("/workouts/{}/session", workout_id)).into_response())
}

#[derive(Deserialize)]
pub struct FinishForm {
    /// Present when the user confirmed finishing with sets remaining.
    pub confirmed: Option<String>,
}

pub async fn finish(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
    Form(form): Form<FinishForm>,
) -> Result<Response> {
    let now = Utc::now();
    let (_, mut session) = state.load(&auth_user.id, &workout_id, now).await?;
    let page = format!("/workouts/{}/session", workout_id);

    let confirmed = form.confirmed.as_deref() == Some("1");
    match session.finish(now, confirmed) {
        Ok(()) => {}
        Err(SessionError::ConfirmationRequired { .. }) => {
            return Ok(Redirect::to(&format!("{}?confirm=1", page)).into_response());
        }
        Err(SessionError::NotInProgress) => return Err(AppError::SessionNotInProgress),
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    }

    // Persist adjusted weights back to the exercises. Best-effort: one
    // failed update doesn't block completion.
    for (exercise_id, weight) in session.changed_overrides() {
        if let Err(e) = state.exercise_repo.update_weight(&exercise_id, weight).await {
            tracing::warn!("Failed to persist weight override for {}: {}", exercise_id, e);
        }
    }

    if let Err(e) = state.snapshot_repo.delete(&auth_user.id, &workout_id).await {
        tracing::warn!("Failed to clear session snapshot: {}", e);
    }

    tracing::info!(
        "Session finished for workout {} ({} volume)",
        workout_id,
        session.volume()
    );

    Ok(Redirect::to(&format!("/workouts/{}", workout_id)).into_response())
}

/// Explicit abandonment: drop the persisted snapshot without logging
/// anything further.
pub async fn abandon(
    State(state): State<SessionRunState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
) -> Result<Response> {
    // Ownership check only; the snapshot key is already user-scoped.
    state
        .workout_repo
        .find_owned(&workout_id, &auth_user.id)
        .await?;

    state.snapshot_repo.delete(&auth_user.id, &workout_id).await?;

    Ok(Redirect::to(&format!("/workouts/{}", workout_id)).into_response())
}
