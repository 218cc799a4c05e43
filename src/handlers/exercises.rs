use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateExercise, UpdateExercise};
use crate::repositories::{ExerciseRepository, WorkoutRepository};

#[derive(Clone)]
pub struct ExercisesState {
    pub workout_repo: WorkoutRepository,
    pub exercise_repo: ExerciseRepository,
}

/// Empty or whitespace-only set-plan fields become "no plan"; anything else
/// is stored verbatim.
fn normalize_set_plan(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub async fn create(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path(workout_id): Path<String>,
    Form(form): Form<CreateExercise>,
) -> Result<Response> {
    // Verify workout ownership
    state
        .workout_repo
        .find_owned(&workout_id, &auth_user.id)
        .await?;

    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Exercise name is required".to_string()));
    }
    if form.sets < 1 {
        return Err(AppError::BadRequest("Sets must be at least 1".to_string()));
    }

    state
        .exercise_repo
        .create(
            &workout_id,
            name,
            form.sets,
            form.reps.unwrap_or(0),
            form.weight.unwrap_or(0.0),
            form.rest_seconds.unwrap_or(60),
            normalize_set_plan(form.set_plan.as_deref()),
        )
        .await?;

    Ok(Redirect::to(&format!("/workouts/{}", workout_id)).into_response())
}

pub async fn update(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path((workout_id, exercise_id)): Path<(String, String)>,
    Form(form): Form<UpdateExercise>,
) -> Result<Response> {
    state
        .workout_repo
        .find_owned(&workout_id, &auth_user.id)
        .await?;

    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Exercise name is required".to_string()));
    }
    if form.sets < 1 {
        return Err(AppError::BadRequest("Sets must be at least 1".to_string()));
    }

    let updated = state
        .exercise_repo
        .update(
            &exercise_id,
            &workout_id,
            name,
            form.sets,
            form.reps.unwrap_or(0),
            form.weight.unwrap_or(0.0),
            form.rest_seconds.unwrap_or(60),
            normalize_set_plan(form.set_plan.as_deref()),
        )
        .await?;
    if !updated {
        return Err(AppError::NotFound("Exercise not found".to_string()));
    }

    Ok(Redirect::to(&format!("/workouts/{}", workout_id)).into_response())
}

pub async fn delete(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path((workout_id, exercise_id)): Path<(String, String)>,
) -> Result<Response> {
    state
        .workout_repo
        .find_owned(&workout_id, &auth_user.id)
        .await?;

    state.exercise_repo.delete(&exercise_id, &workout_id).await?;

    Ok(Redirect::to(&format!("/workouts/{}", workout_id)).into_response())
}

#[derive(Deserialize)]
pub struct MoveForm {
    pub direction: String,
}

pub async fn shift(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path((workout_id, exercise_id)): Path<(String, String)>,
    Form(form): Form<MoveForm>,
) -> Result<Response> {
    state
        .workout_repo
        .find_owned(&workout_id, &auth_user.id)
        .await?;

    let up = match form.direction.as_str() {
        "up" => true,
        "down" => false,
        _ => return Err(AppError::BadRequest("Invalid direction".to_string())),
    };

    state
        .exercise_repo
        .shift(&exercise_id, &workout_id, up)
        .await?;

    Ok(Redirect::to(&format!("/workouts/{}", workout_id)).into_response())
}
