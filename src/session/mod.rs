//! Workout session execution: timer, snapshot schema, and the state machine
//! that drives set completion, rest countdowns and finalization.

pub mod engine;
pub mod snapshot;
pub mod timer;

pub use engine::{ActiveSession, PlannedSet, SessionError, SessionExercise};
pub use snapshot::{snapshot_key, RestTimer, SessionSnapshot, SNAPSHOT_VERSION};
pub use timer::{SessionStatus, SessionTimer, TimerSnapshot};
