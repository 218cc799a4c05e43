#![allow(dead_code)]

use axum::Router;

use repset::db::{create_memory_pool, DbPool};
use repset::middleware::auth::AuthLayerState;
use repset::migrations::run_migrations_for_tests;
use repset::models::{Exercise, User, Workout};
use repset::repositories::{
    AuthSessionRepository, ExerciseRepository, LogRepository, SnapshotRepository, UserRepository,
    WorkoutRepository,
};

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    use repset::handlers::{
        auth, catalog, dashboard, exercises, profile, progress, session, workouts,
    };

    let user_repo = UserRepository::new(pool.clone());
    let auth_session_repo = AuthSessionRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let log_repo = LogRepository::new(pool.clone());
    let snapshot_repo = SnapshotRepository::new(pool.clone());

    let auth_state = auth::AuthState {
        user_repo: user_repo.clone(),
        auth_session_repo: auth_session_repo.clone(),
    };
    let dashboard_state = dashboard::DashboardState {
        workout_repo: workout_repo.clone(),
        log_repo: log_repo.clone(),
        snapshot_repo: snapshot_repo.clone(),
        resume_window_hours: 12,
    };
    let workouts_state = workouts::WorkoutsState {
        workout_repo: workout_repo.clone(),
        exercise_repo: exercise_repo.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        workout_repo: workout_repo.clone(),
        exercise_repo: exercise_repo.clone(),
    };
    let session_state = session::SessionRunState {
        workout_repo: workout_repo.clone(),
        exercise_repo: exercise_repo.clone(),
        log_repo: log_repo.clone(),
        snapshot_repo: snapshot_repo.clone(),
    };
    let catalog_state = catalog::CatalogState {
        workout_repo: workout_repo.clone(),
        exercise_repo: exercise_repo.clone(),
    };
    let progress_state = progress::ProgressState {
        log_repo: log_repo.clone(),
        workout_repo: workout_repo.clone(),
    };
    let profile_state = profile::ProfileState {
        user_repo: user_repo.clone(),
        auth_session_repo: auth_session_repo.clone(),
    };
    let auth_layer_state = AuthLayerState {
        user_repo,
        auth_session_repo,
    };

    repset::routes::create_router(
        auth_state,
        dashboard_state,
        workouts_state,
        exercises_state,
        session_state,
        catalog_state,
        progress_state,
        profile_state,
        auth_layer_state,
    )
}

pub async fn create_test_user(pool: &DbPool, username: &str, password: &str) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo.create(username, password).await.unwrap()
}

pub async fn create_session_cookie(pool: &DbPool, user: &User) -> String {
    let auth_session_repo = AuthSessionRepository::new(pool.clone());
    let token = auth_session_repo.create(&user.id).await.unwrap();
    format!("session={}", token)
}

pub fn extract_cookie_header(set_cookie: &str) -> String {
    // Extract just the cookie name=value part for use in Cookie header
    set_cookie.split(';').next().unwrap_or("").to_string()
}

// Test data creation helpers
pub async fn create_test_workout(pool: &DbPool, user_id: &str, name: &str) -> Workout {
    let workout_repo = WorkoutRepository::new(pool.clone());
    workout_repo.create(user_id, name, "").await.unwrap()
}

pub async fn create_test_exercise(
    pool: &DbPool,
    workout_id: &str,
    name: &str,
    sets: i64,
    reps: i64,
    weight: f64,
) -> Exercise {
    let exercise_repo = ExerciseRepository::new(pool.clone());
    exercise_repo
        .create(workout_id, name, sets, reps, weight, 90, None)
        .await
        .unwrap()
}
