use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// One completed set. Append-only: rows are never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    pub exercise_id: String,
    pub user_id: String,
    pub weight: f64,
    pub reps: i64,
    /// Always 1 in the session flow; kept as a column for bulk imports.
    pub sets: i64,
    pub completed_at: DateTime<Utc>,
}

impl FromSqliteRow for WorkoutLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            exercise_id: row.get("exercise_id")?,
            user_id: row.get("user_id")?,
            weight: row.get("weight")?,
            reps: row.get("reps")?,
            sets: row.get("sets")?,
            completed_at: row.get("completed_at")?,
        })
    }
}
