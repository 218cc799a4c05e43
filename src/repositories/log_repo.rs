use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, WorkoutLog};

/// Per-exercise aggregate for the progress view.
#[derive(Debug, Clone)]
pub struct ExerciseProgress {
    pub exercise_id: String,
    pub exercise_name: String,
    pub workout_name: String,
    pub total_sets: i64,
    pub total_volume: f64,
    pub max_weight: f64,
}

/// User-wide aggregate for the progress view.
#[derive(Debug, Clone, Default)]
pub struct ProgressTotals {
    pub total_sets: i64,
    pub total_volume: f64,
    pub sets_this_week: i64,
}

#[derive(Clone)]
pub struct LogRepository {
    pool: DbPool,
}

impl LogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append one completed set. Log rows are never mutated afterwards.
    pub async fn append(
        &self,
        exercise_id: &str,
        user_id: &str,
        weight: f64,
        reps: i64,
        completed_at: DateTime<Utc>,
    ) -> Result<WorkoutLog> {
        let log = WorkoutLog {
            id: Uuid::new_v4().to_string(),
            exercise_id: exercise_id.to_string(),
            user_id: user_id.to_string(),
            weight,
            reps,
            sets: 1,
            completed_at,
        };
        let log_clone = log.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workout_logs (id, exercise_id, user_id, weight, reps, sets, completed_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    log_clone.id,
                    log_clone.exercise_id,
                    log_clone.user_id,
                    log_clone.weight,
                    log_clone.reps,
                    log_clone.sets,
                    log_clone.completed_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(log)
    }

    /// Cumulative volume logged for one workout's exercises since `since`.
    /// Used to rebuild the running session's volume counter on hydration.
    pub async fn volume_for_workout_since(
        &self,
        user_id: &str,
        workout_id: &str,
        since: DateTime<Utc>,
    ) -> Result<f64> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let workout_id = workout_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let volume: Option<f64> = conn.query_row(
                "SELECT SUM(wl.weight * wl.reps)
                 FROM workout_logs wl
                 JOIN exercises e ON wl.exercise_id = e.id
                 WHERE wl.user_id = ? AND e.workout_id = ? AND wl.completed_at >= ?",
                rusqlite::params![user_id, workout_id, since],
                |row| row.get(0),
            )?;
            Ok(volume.unwrap_or(0.0))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_recent_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<WorkoutLog>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_logs WHERE user_id = ?
                 ORDER BY completed_at DESC LIMIT ?",
            )?;
            let logs = stmt
                .query_map(rusqlite::params![user_id, limit], WorkoutLog::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(logs)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn totals_for_user(&self, user_id: &str) -> Result<ProgressTotals> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let (total_sets, total_volume): (i64, Option<f64>) = conn.query_row(
                "SELECT COUNT(*), SUM(weight * reps) FROM workout_logs WHERE user_id = ?",
                [&user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let sets_this_week: i64 = conn.query_row(
                "SELECT COUNT(*) FROM workout_logs
                 WHERE user_id = ? AND completed_at >= datetime('now', '-7 days')",
                [&user_id],
                |row| row.get(0),
            )?;
            Ok(ProgressTotals {
                total_sets,
                total_volume: total_volume.unwrap_or(0.0),
                sets_this_week,
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn progress_by_exercise(&self, user_id: &str) -> Result<Vec<ExerciseProgress>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT wl.exercise_id, e.name AS exercise_name, w.name AS workout_name,
                        COUNT(*) AS total_sets,
                        SUM(wl.weight * wl.reps) AS total_volume,
                        MAX(wl.weight) AS max_weight
                 FROM workout_logs wl
                 JOIN exercises e ON wl.exercise_id = e.id
                 JOIN workouts w ON e.workout_id = w.id
                 WHERE wl.user_id = ?
                 GROUP BY wl.exercise_id
                 ORDER BY total_volume DESC",
            )?;
            let rows = stmt
                .query_map([&user_id], |row| {
                    Ok(ExerciseProgress {
                        exercise_id: row.get("exercise_id")?,
                        exercise_name: row.get("exercise_name")?,
                        workout_name: row.get("workout_name")?,
                        total_sets: row.get("total_sets")?,
                        total_volume: row.get::<_, Option<f64>>("total_volume")?.unwrap_or(0.0),
                        max_weight: row.get::<_, Option<f64>>("max_weight")?.unwrap_or(0.0),
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;
    use crate::repositories::{ExerciseRepository, UserRepository, WorkoutRepository};

    async fn setup() -> (DbPool, String, String, String) {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        let user = UserRepository::new(pool.clone())
            .create("alice", "password")
            .await
            .unwrap();
        let workout = WorkoutRepository::new(pool.clone())
            .create(&user.id, "Push Day", "chest")
            .await
            .unwrap();
        let exercise = ExerciseRepository::new(pool.clone())
            .create(&workout.id, "Bench Press", 3, 10, 60.0, 90, None)
            .await
            .unwrap();
        (pool, user.id, workout.id, exercise.id)
    }

    #[tokio::test]
    async fn test_append_and_totals() {
        let (pool, user_id, _workout_id, exercise_id) = setup().await;
        let repo = LogRepository::new(pool);
        let now = Utc::now();

        repo.append(&exercise_id, &user_id, 60.0, 10, now).await.unwrap();
        repo.append(&exercise_id, &user_id, 60.0, 8, now).await.unwrap();

        let totals = repo.totals_for_user(&user_id).await.unwrap();
        assert_eq!(totals.total_sets, 2);
        assert_eq!(totals.total_volume, 60.0 * 10.0 + 60.0 * 8.0);
        assert_eq!(totals.sets_this_week, 2);
    }

    #[tokio::test]
    async fn test_volume_for_workout_since_ignores_older_logs() {
        let (pool, user_id, workout_id, exercise_id) = setup().await;
        let repo = LogRepository::new(pool);
        let session_start = Utc::now();

        repo.append(
            &exercise_id,
            &user_id,
            100.0,
            10,
            session_start - chrono::Duration::hours(2),
        )
        .await
        .unwrap();
        repo.append(&exercise_id, &user_id, 60.0, 10, session_start)
            .await
            .unwrap();

        let volume = repo
            .volume_for_workout_since(&user_id, &workout_id, session_start)
            .await
            .unwrap();
        assert_eq!(volume, 600.0);
    }

    #[tokio::test]
    async fn test_progress_by_exercise_aggregates() {
        let (pool, user_id, _workout_id, exercise_id) = setup().await;
        let repo = LogRepository::new(pool);
        let now = Utc::now();

        repo.append(&exercise_id, &user_id, 60.0, 10, now).await.unwrap();
        repo.append(&exercise_id, &user_id, 70.0, 5, now).await.unwrap();

        let progress = repo.progress_by_exercise(&user_id).await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].exercise_name, "Bench Press");
        assert_eq!(progress[0].workout_name, "Push Day");
        assert_eq!(progress[0].total_sets, 2);
        assert_eq!(progress[0].max_weight, 70.0);
        assert_eq!(progress[0].total_volume, 600.0 + 350.0);
    }

    #[tokio::test]
    async fn test_totals_for_user_with_no_logs() {
        let (pool, user_id, _, _) = setup().await;
        let repo = LogRepository::new(pool);

        let totals = repo.totals_for_user(&user_id).await.unwrap();
        assert_eq!(totals.total_sets, 0);
        assert_eq!(totals.total_volume, 0.0);
    }
}
