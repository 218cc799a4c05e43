use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::Workout;
use crate::repositories::{log_repo::ProgressTotals, LogRepository, SnapshotRepository, WorkoutRepository};

#[derive(Clone)]
pub struct DashboardState {
    pub workout_repo: WorkoutRepository,
    pub log_repo: LogRepository,
    pub snapshot_repo: SnapshotRepository,
    pub resume_window_hours: i64,
}

/// "You left a session running" banner data.
struct ResumeOffer {
    workout_id: String,
    workout_name: String,
}

#[derive(Template)]
#[template(path = "dashboard/index.html")]
struct DashboardTemplate {
    user: AuthUser,
    recent_workouts: Vec<Workout>,
    totals: ProgressTotals,
    resume: Option<ResumeOffer>,
}

pub async fn index(State(state): State<DashboardState>, auth_user: AuthUser) -> Result<Response> {
    let recent_workouts = state.workout_repo.find_recent_by_user(&auth_user.id, 5).await?;
    let totals = state.log_repo.totals_for_user(&auth_user.id).await?;

    // Offer to resume a still-active session left behind on another page
    let resume = match state
        .snapshot_repo
        .find_resumable(
            &auth_user.id,
            chrono::Duration::hours(state.resume_window_hours),
            Utc::now(),
        )
        .await
    {
        Ok(Some(snapshot)) => state
            .workout_repo
            .find_by_id(&snapshot.workout_id)
            .await?
            .filter(|w| w.user_id == auth_user.id)
            .map(|w| ResumeOffer {
                workout_id: w.id,
                workout_name: w.name,
            }),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Resumable session scan failed: {}", e);
            None
        }
    };

    let template = DashboardTemplate {
        user: auth_user,
        recent_workouts,
        totals,
        resume,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}
