use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, Workout};

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, name: &str, muscle_groups: &str) -> Result<Workout> {
        let workout = Workout {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            muscle_groups: muscle_groups.to_string(),
            created_at: Utc::now(),
        };
        let workout_clone = workout.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workouts (id, user_id, name, muscle_groups, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![
                    workout_clone.id,
                    workout_clone.user_id,
                    workout_clone.name,
                    workout_clone.muscle_groups,
                    workout_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(workout)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Workout>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ?")?;
            let result = stmt.query_row([&id], Workout::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// A workout visible to this user, or NotFound. Ownership is enforced
    /// here so handlers can't accidentally leak foreign rows.
    pub async fn find_owned(&self, id: &str, user_id: &str) -> Result<Workout> {
        let workout = self
            .find_by_id(id)
            .await?
            .filter(|w| w.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;
        Ok(workout)
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn
                .prepare("SELECT * FROM workouts WHERE user_id = ? ORDER BY created_at DESC")?;
            let workouts = stmt
                .query_map([&user_id], Workout::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_recent_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Workout>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workouts WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
            )?;
            let workouts = stmt
                .query_map(rusqlite::params![user_id, limit], Workout::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn count_by_user(&self, user_id: &str) -> Result<i64> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM workouts WHERE user_id = ?",
                [&user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        name: &str,
        muscle_groups: &str,
    ) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        let name = name.to_string();
        let muscle_groups = muscle_groups.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE workouts SET name = ?, muscle_groups = ? WHERE id = ? AND user_id = ?",
                rusqlite::params![name, muscle_groups, id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Delete a workout; its exercises (and their logs) go with it via
    /// cascading foreign keys.
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM workouts WHERE id = ? AND user_id = ?",
                rusqlite::params![id, user_id],
            )?;
            Ok(rows > 0)
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
    use crate::repositories::{ExerciseRepository, UserRepository};

    async fn setup() -> (DbPool, String) {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        let user = UserRepository::new(pool.clone())
            .create("alice", "password")
            .await
            .unwrap();
        (pool, user.id)
    }

    #[tokio::test]
    async fn test_create_and_find_owned() {
        let (pool, user_id) = setup().await;
        let repo = WorkoutRepository::new(pool);

        let workout = repo.create(&user_id, "Push Day", "chest, triceps").await.unwrap();
        let found = repo.find_owned(&workout.id, &user_id).await.unwrap();

        assert_eq!(found.name, "Push Day");
        assert_eq!(found.muscle_groups, "chest, triceps");
    }

    #[tokio::test]
    async fn test_find_owned_rejects_foreign_user() {
        let (pool, user_id) = setup().await;
        let other = UserRepository::new(pool.clone())
            .create("mallory", "password")
            .await
            .unwrap();
        let repo = WorkoutRepository::new(pool);

        let workout = repo.create(&user_id, "Push Day", "").await.unwrap();
        let result = repo.find_owned(&workout.id, &other.id).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_exercises() {
        let (pool, user_id) = setup().await;
        let repo = WorkoutRepository::new(pool.clone());
        let exercise_repo = ExerciseRepository::new(pool);

        let workout = repo.create(&user_id, "Push Day", "").await.unwrap();
        exercise_repo
            .create(&workout.id, "Bench Press", 3, 10, 60.0, 90, None)
            .await
            .unwrap();

        assert!(repo.delete(&workout.id, &user_id).await.unwrap());

        let remaining = exercise_repo.find_by_workout(&workout.id).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_update_wrong_user_is_noop() {
        let (pool, user_id) = setup().await;
        let repo = WorkoutRepository::new(pool);

        let workout = repo.create(&user_id, "Push Day", "").await.unwrap();
        let updated = repo.update(&workout.id, "someone-else", "Hacked", "").await.unwrap();

        assert!(!updated);
        assert_eq!(repo.find_by_id(&workout.id).await.unwrap().unwrap().name, "Push Day");
    }
}
