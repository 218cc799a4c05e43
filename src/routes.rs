use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{
    auth, catalog, dashboard, exercises, health, profile, progress, session, workouts,
};
use crate::middleware::auth::{resolve_session, AuthLayerState};

#[allow(clippy::too_many_arguments)]
pub fn create_router(
    auth_state: auth::AuthState,
    dashboard_state: dashboard::DashboardState,
    workouts_state: workouts::WorkoutsState,
    exercises_state: exercises::ExercisesState,
    session_state: session::SessionRunState,
    catalog_state: catalog::CatalogState,
    progress_state: progress::ProgressState,
    profile_state: profile::ProfileState,
    auth_layer_state: AuthLayerState,
) -> Router {
    let auth_routes = Router::new()
        .route(
            "/auth/login",
            get(auth::login_page).post(auth::login_submit),
        )
        .route(
            "/auth/register",
            get(auth::register_page).post(auth::register_submit),
        )
        .route("/auth/logout", post(auth::logout))
        .with_state(auth_state);

    let dashboard_routes = Router::new()
        .route("/", get(dashboard::index))
        .with_state(dashboard_state);

    let workout_routes = Router::new()
        .route("/workouts", get(workouts::list).post(workouts::create))
        .route("/workouts/new", get(workouts::new_page))
        .route("/workouts/{id}", get(workouts::show).post(workouts::update))
        .route("/workouts/{id}/edit", get(workouts::edit_page))
        .route("/workouts/{id}/delete", post(workouts::delete))
        .with_state(workouts_state);

    let exercise_routes = Router::new()
        .route("/workouts/{id}/exercises", post(exercises::create))
        .route(
            "/workouts/{id}/exercises/{exercise_id}",
            post(exercises::update),
        )
        .route(
            "/workouts/{id}/exercises/{exercise_id}/delete",
            post(exercises::delete),
        )
        .route(
            "/workouts/{id}/exercises/{exercise_id}/move",
            post(exercises::shift),
        )
        .with_state(exercises_state);

    let session_routes = Router::new()
        .route("/workouts/{id}/session", get(session::show))
        .route("/workouts/{id}/session/start", post(session::start))
        .route("/workouts/{id}/session/complete", post(session::complete_set))
        .route("/workouts/{id}/session/select", post(session::select_exercise))
        .route("/workouts/{id}/session/weight", post(session::set_weight))
        .route("/workouts/{id}/session/finish", post(session::finish))
        .route("/workouts/{id}/session/abandon", post(session::abandon))
        .with_state(session_state);

    let catalog_routes = Router::new()
        .route("/catalog", get(catalog::list))
        .route("/catalog/{slug}/import", post(catalog::import))
        .with_state(catalog_state);

    let progress_routes = Router::new()
        .route("/progress", get(progress::index))
        .with_state(progress_state);

    let profile_routes = Router::new()
        .route(
            "/profile",
            get(profile::index).post(profile::change_password),
        )
        .with_state(profile_state);

    Router::new()
        .merge(dashboard_routes)
        .merge(auth_routes)
        .merge(workout_routes)
        .merge(exercise_routes)
        .merge(session_routes)
        .merge(catalog_routes)
        .merge(progress_routes)
        .merge(profile_routes)
        .route("/health", get(health::health_check))
        .layer(middleware::from_fn_with_state(
            auth_layer_state,
            resolve_session,
        ))
}
