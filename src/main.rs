use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repset::config::Config;
use repset::handlers::{auth, catalog, dashboard, exercises, profile, progress, session, workouts};
use repset::middleware::auth::AuthLayerState;
use repset::repositories::{
    AuthSessionRepository, ExerciseRepository, LogRepository, SnapshotRepository, UserRepository,
    WorkoutRepository,
};
use repset::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repset=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let auth_session_repo = AuthSessionRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let log_repo = LogRepository::new(pool.clone());
    let snapshot_repo = SnapshotRepository::new(pool.clone());

    // Create handler states
    let auth_state = auth::AuthState {
        user_repo: user_repo.clone(),
        auth_session_repo: auth_session_repo.clone(),
    };
    let dashboard_state = dashboard::DashboardState {
        workout_repo: workout_repo.clone(),
        log_repo: log_repo.clone(),
        snapshot_repo: snapshot_repo.clone(),
        resume_window_hours: config.resume_window_hours,
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

    // Build router
    let app = routes::create_router(
        auth_state,
        dashboard_state,
        workouts_state,
        exercises_state,
        session_state,
        catalog_state,
        progress_state,
        profile_state,
        auth_layer_state,
    );

    // Start server
    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
