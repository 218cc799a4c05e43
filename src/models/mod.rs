pub mod exercise;
pub mod from_row;
pub mod set_plan;
pub mod user;
pub mod workout;
pub mod workout_log;

pub use exercise::{CreateExercise, Exercise, UpdateExercise};
pub use from_row::FromSqliteRow;
pub use set_plan::SetPlanEntry;
pub use user::{CreateUser, LoginCredentials, User};
pub use workout::{CreateWorkout, Workout};
pub use workout_log::WorkoutLog;
