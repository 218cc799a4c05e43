use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::catalog::{self, WorkoutTemplate};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::repositories::{ExerciseRepository, WorkoutRepository};

#[derive(Clone)]
pub struct CatalogState {
    pub workout_repo: WorkoutRepository,
    pub exercise_repo: ExerciseRepository,
}

#[derive(Template)]
#[template(path = "catalog/list.html")]
struct CatalogTemplate {
    user: AuthUser,
    templates: &'static [WorkoutTemplate],
}

pub async fn list(auth_user: AuthUser) -> Result<Response> {
    let template = CatalogTemplate {
        user: auth_user,
        templates: catalog::TEMPLATES,
    };

    Ok(Html(
        template
            .render()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    )
    .into_response())
}

/// Clone a catalog template into the user's own workout + exercises.
pub async fn import(
    State(state): State<CatalogState>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> Result<Response> {
    let template = catalog::find_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

    let workout = state
        .workout_repo
        .create(&auth_user.id, template.name, template.muscle_groups)
        .await?;

    for exercise in template.exercises {
        let (sets, reps, weight) = catalog::resolve_import(exercise);
        state
            .exercise_repo
            .create(
                &workout.id,
                exercise.name,
                sets,
                reps,
                weight,
                exercise.rest_seconds,
                exercise.set_plan,
            )
            .await?;
    }

    tracing::info!("Imported template {} for user {}", slug, auth_user.id);

    Ok(Redirect::to(&format!("/workouts/{}", workout.id)).into_response())
}
