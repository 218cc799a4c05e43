use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{Exercise, FromSqliteRow};

#[derive(Clone)]
pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?")?;
            let result = stmt.query_row([&id], Exercise::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Exercises of one workout in execution order.
    pub async fn find_by_workout(&self, workout_id: &str) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        let workout_id = workout_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM exercises WHERE workout_id = ? ORDER BY order_index, created_at",
            )?;
            let exercises = stmt
                .query_map([&workout_id], Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        workout_id: &str,
        name: &str,
        sets: i64,
        reps: i64,
        weight: f64,
        rest_seconds: i64,
        set_plan: Option<&str>,
    ) -> Result<Exercise> {
        let pool = self.pool.clone();
        let workout_id = workout_id.to_string();
        let exercise = Exercise {
            id: Uuid::new_v4().to_string(),
            workout_id: workout_id.clone(),
            name: name.to_string(),
            sets: sets.max(1),
            reps,
            weight,
            rest_seconds,
            order_index: 0, // assigned below
            set_plan: set_plan.map(|s| s.to_string()),
            created_at: Utc::now(),
        };
        let mut exercise_clone = exercise.clone();

        let created = tokio::task::spawn_blocking(move || -> Result<Exercise> {
            let conn = pool.get()?;
            // Append at the end of the execution order
            let next_index: i64 = conn.query_row(
                "SELECT COALESCE(MAX(order_index) + 1, 0) FROM exercises WHERE workout_id = ?",
                [&workout_id],
                |row| row.get(0),
            )?;
            exercise_clone.order_index = next_index;

            conn.execute(
                "INSERT INTO exercises
                 (id, workout_id, name, sets, reps, weight, rest_seconds, order_index, set_plan, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    exercise_clone.id,
                    exercise_clone.workout_id,
                    exercise_clone.name,
                    exercise_clone.sets,
                    exercise_clone.reps,
                    exercise_clone.weight,
                    exercise_clone.rest_seconds,
                    exercise_clone.order_index,
                    exercise_clone.set_plan,
                    exercise_clone.created_at
                ],
            )?;
            Ok(exercise_clone)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(created)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: &str,
        workout_id: &str,
        name: &str,
        sets: i64,
        reps: i64,
        weight: f64,
        rest_seconds: i64,
        set_plan: Option<&str>,
    ) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let workout_id = workout_id.to_string();
        let name = name.to_string();
        let set_plan = set_plan.map(|s| s.to_string());
        let sets = sets.max(1);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE exercises
                 SET name = ?, sets = ?, reps = ?, weight = ?, rest_seconds = ?, set_plan = ?
                 WHERE id = ? AND workout_id = ?",
                rusqlite::params![name, sets, reps, weight, rest_seconds, set_plan, id, workout_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Persist a session weight override as the new default weight.
    pub async fn update_weight(&self, id: &str, weight: f64) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE exercises SET weight = ? WHERE id = ?",
                rusqlite::params![weight, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, id: &str, workout_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let workout_id = workout_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM exercises WHERE id = ? AND workout_id = ?",
                rusqlite::params![id, workout_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Swap an exercise one position up or down in the execution order.
    pub async fn shift(&self, id: &str, workout_id: &str, up: bool) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let workout_id = workout_id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;

            let current: Option<i64> = tx
                .query_row(
                    "SELECT order_index FROM exercises WHERE id = ? AND workout_id = ?",
                    rusqlite::params![id, workout_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(false);
            };

            let neighbor: Option<(String, i64)> = if up {
                tx.query_row(
                    "SELECT id, order_index FROM exercises
                     WHERE workout_id = ? AND order_index < ?
                     ORDER BY order_index DESC LIMIT 1",
                    rusqlite::params![workout_id, current],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
            } else {
                tx.query_row(
                    "SELECT id, order_index FROM exercises
                     WHERE workout_id = ? AND order_index > ?
                     ORDER BY order_index ASC LIMIT 1",
                    rusqlite::params![workout_id, current],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
            };

            let Some((neighbor_id, neighbor_index)) = neighbor else {
                return Ok(false); // already at the edge
            };

            tx.execute(
                "UPDATE exercises SET order_index = ? WHERE id = ?",
                rusqlite::params![neighbor_index, id],
            )?;
            tx.execute(
                "UPDATE exercises SET order_index = ? WHERE id = ?",
                rusqlite::params![current, neighbor_id],
            )?;
            tx.commit()?;
            Ok(true)
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
    use crate::repositories::{UserRepository, WorkoutRepository};

    async fn setup() -> (DbPool, String) {
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
        (pool, workout.id)
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_order() {
        let (pool, workout_id) = setup().await;
        let repo = ExerciseRepository::new(pool);

        let a = repo
            .create(&workout_id, "Bench Press", 3, 10, 60.0, 90, None)
            .await
            .unwrap();
        let b = repo
            .create(&workout_id, "Dips", 3, 12, 0.0, 60, None)
            .await
            .unwrap();

        assert_eq!(a.order_index, 0);
        assert_eq!(b.order_index, 1);
    }

    #[tokio::test]
    async fn test_find_by_workout_respects_order() {
        let (pool, workout_id) = setup().await;
        let repo = ExerciseRepository::new(pool);

        repo.create(&workout_id, "Bench Press", 3, 10, 60.0, 90, None)
            .await
            .unwrap();
        repo.create(&workout_id, "Dips", 3, 12, 0.0, 60, None)
            .await
            .unwrap();

        let exercises = repo.find_by_workout(&workout_id).await.unwrap();
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].name, "Bench Press");
        assert_eq!(exercises[1].name, "Dips");
    }

    #[tokio::test]
    async fn test_shift_swaps_neighbors() {
        let (pool, workout_id) = setup().await;
        let repo = ExerciseRepository::new(pool);

        repo.create(&workout_id, "Bench Press", 3, 10, 60.0, 90, None)
            .await
            .unwrap();
        let dips = repo
            .create(&workout_id, "Dips", 3, 12, 0.0, 60, None)
            .await
            .unwrap();

        assert!(repo.shift(&dips.id, &workout_id, true).await.unwrap());

        let exercises = repo.find_by_workout(&workout_id).await.unwrap();
        assert_eq!(exercises[0].name, "Dips");
        assert_eq!(exercises[1].name, "Bench Press");

        // Already at the top, nothing to swap with
        assert!(!repo.shift(&dips.id, &workout_id, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_plan_round_trips_verbatim() {
        let (pool, workout_id) = setup().await;
        let repo = ExerciseRepository::new(pool);

        let raw = r#"[{"set":1,"reps":10,"weight":60},{"set":2,"reps":8,"weight":70}]"#;
        let created = repo
            .create(&workout_id, "Bench Press", 2, 10, 60.0, 90, Some(raw))
            .await
            .unwrap();

        let found = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(found.set_plan.as_deref(), Some(raw));
        assert_eq!(found.plan().len(), 2);
    }

    #[tokio::test]
    async fn test_update_weight() {
        let (pool, workout_id) = setup().await;
        let repo = ExerciseRepository::new(pool);

        let ex = repo
            .create(&workout_id, "Bench Press", 3, 10, 60.0, 90, None)
            .await
            .unwrap();
        assert!(repo.update_weight(&ex.id, 62.5).await.unwrap());

        let found = repo.find_by_id(&ex.id).await.unwrap().unwrap();
        assert_eq!(found.weight, 62.5);
    }
}
