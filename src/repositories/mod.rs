pub mod auth_session_repo;
pub mod exercise_repo;
pub mod log_repo;
pub mod snapshot_repo;
pub mod user_repo;
pub mod workout_repo;

pub use auth_session_repo::AuthSessionRepository;
pub use exercise_repo::ExerciseRepository;
pub use log_repo::{ExerciseProgress, LogRepository, ProgressTotals};
pub use snapshot_repo::SnapshotRepository;
pub use user_repo::UserRepository;
pub use workout_repo::WorkoutRepository;
