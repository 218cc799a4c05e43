use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateWorkout, Exercise, Workout};
use crate::repositories::{ExerciseRepository, WorkoutRepository};

#[derive(Clone)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
    pub exercise_repo: ExerciseRepository,
}

// Templates
#[derive(Template)]
#[template(path = "workouts/list.html")]
struct WorkoutsListTemplate {
    user: AuthUser,
    workouts: Vec<Workout>,
}

#[derive(Template)]
#[template(path = "workouts/new.html")]
struct NewWorkoutTemplate {
    user: AuthUser,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "workouts/show.html")]
struct ShowWorkoutTemplate {
    user: AuthUser,
    workout: Workout,
    exercises: Vec<Exercise>,
}

#[derive(Template)]
#[template(path = "workouts/edit.html")]
struct EditWorkoutTemplate {
    user: AuthUser,
    workout: Workout,
}

// Handlers
pub async fn list(State(state): State<WorkoutsState>, auth_user: AuthUser) -> Result<Response> {
    let workouts = state.workout_repo.find_by_user(&auth_user.id).await?;

    let template = WorkoutsListTemplate {
        user: auth_user,
        workouts,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn new_page(auth_user: AuthUser) -> Result<Response> {
    let template = NewWorkoutTemplate {
        user: auth_user,
        error: None,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn create(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Form(form): Form<CreateWorkout>,
) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        let template = NewWorkoutTemplate {
            user: auth_user,
            error: Some("Name is required".to_string()),
        };
        return Ok(Html(
            template
                .render()
                .map_err(|e| AppError::Internal(e.to_string()))?,
        )
        .into_response());
    }

    let workout = state
        .workout_repo
        .create(
            &auth_user.id,
            name,
            form.muscle_groups.as_deref().unwrap_or("").trim(),
        )
        .await?;

    Ok(Redirect::to(&format!("/workouts/{}", workout.id)).into_response())
}

pub async fn show(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let workout = state.workout_repo.find_owned(&id, &auth_user.id).await?;
    let exercises = state.exercise_repo.find_by_workout(&id).await?;

    let template = ShowWorkoutTemplate {
        user: auth_user,
        workout,
        exercises,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn edit_page(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let workout = state.workout_repo.find_owned(&id, &auth_user.id).await?;

    let template = EditWorkoutTemplate {
        user: auth_user,
        workout,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

pub async fn update(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Form(form): Form<CreateWorkout>,
) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    state
        .workout_repo
        .update(
            &id,
            &auth_user.id,
            name,
            form.muscle_groups.as_deref().unwrap_or("").trim(),
        )
        .await?;

    Ok(Redirect::to(&format!("/workouts/{}", id)).into_response())
}

pub async fn delete(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    state.workout_repo.delete(&id, &auth_user.id).await?;
    Ok(Redirect::to("/workouts").into_response())
}
