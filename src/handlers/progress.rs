use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::repositories::{ExerciseProgress, LogRepository, ProgressTotals, WorkoutRepository};

#[derive(Clone)]
pub struct ProgressState {
    pub log_repo: LogRepository,
    pub workout_repo: WorkoutRepository,
}

#[derive(Template)]
#[template(path = "progress/index.html")]
struct ProgressTemplate {
    user: AuthUser,
    totals: ProgressTotals,
    workout_count: i64,
    exercises: Vec<ExerciseProgress>,
}

pub async fn index(
    State(state): State<ProgressState>,
    auth_user: AuthUser,
) -> Result<Response> {
    let totals = state.log_repo.totals_for_user(&auth_user.id).await?;
    let workout_count = state.workout_repo.count_by_user(&auth_user.id).await?;
    let exercises = state.log_repo.progress_by_exercise(&auth_user.id).await?;

    let template = ProgressTemplate {
        user: auth_user,
        totals,
        workout_count,
        exercises,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}
