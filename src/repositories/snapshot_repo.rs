use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::session::{snapshot_key, SessionSnapshot, SessionStatus, SNAPSHOT_VERSION};

/// Durable store for in-progress session snapshots, keyed per user+workout.
///
/// Plays the role a browser's local storage played in the original flow: one
/// overwritable entry per running session, read back on page mount, deleted on
/// finalize or abandonment. Validation happens on read; anything that doesn't
/// match the current schema version or the expected user/workout is discarded.
#[derive(Clone)]
pub struct SnapshotRepository {
    pool: DbPool,
}

impl SnapshotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Overwrite the stored snapshot for this user+workout.
    pub async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let pool = self.pool.clone();
        let key = snapshot_key(&snapshot.user_id, &snapshot.workout_id);
        let user_id = snapshot.user_id.clone();
        let workout_id = snapshot.workout_id.clone();
        let updated_at = snapshot.last_updated;
        let data = serde_json::to_string(snapshot)
            .map_err(|e| AppError::Internal(format!("Snapshot serialization: {}", e)))?;

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO session_snapshots (key, user_id, workout_id, data, updated_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                rusqlite::params![key, user_id, workout_id, data, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Best-effort save: failures are logged, never surfaced. Snapshot writes
    /// happen on every state change and must not break the session flow.
    pub async fn save_best_effort(&self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.save(snapshot).await {
            tracing::error!("Failed to persist session snapshot: {}", e);
        }
    }

    /// Load and validate the snapshot for this user+workout.
    ///
    /// Malformed JSON, a version mismatch, or ids that don't match the key are
    /// all treated the same way: log, discard, return None so the caller
    /// starts fresh.
    pub async fn load(&self, user_id: &str, workout_id: &str) -> Result<Option<SessionSnapshot>> {
        let pool = self.pool.clone();
        let key = snapshot_key(user_id, workout_id);
        let user_id = user_id.to_string();
        let workout_id = workout_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM session_snapshots WHERE key = ?",
                    [&key],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(data) = data else {
                return Ok(None);
            };

            Ok(validate(&data, &user_id, &workout_id))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete(&self, user_id: &str, workout_id: &str) -> Result<()> {
        let pool = self.pool.clone();
        let key = snapshot_key(user_id, workout_id);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute("DELETE FROM session_snapshots WHERE key = ?", [&key])?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Scan all of a user's snapshots for the most recent one that is still
    /// in_progress within the staleness window. Used to offer "resume" from
    /// pages other than the session itself.
    pub async fn find_resumable(
        &self,
        user_id: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionSnapshot>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let cutoff = now - window;

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT data, workout_id FROM session_snapshots
                 WHERE user_id = ? AND updated_at >= ?
                 ORDER BY updated_at DESC",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, cutoff], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (data, workout_id) in rows {
                if let Some(snapshot) = validate(&data, &user_id, &workout_id) {
                    if snapshot.status == SessionStatus::InProgress {
                        return Ok(Some(snapshot));
                    }
                }
            }
            Ok(None)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn validate(data: &str, user_id: &str, workout_id: &str) -> Option<SessionSnapshot> {
    let snapshot: SessionSnapshot = match serde_json::from_str(data) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Discarding malformed session snapshot: {}", e);
            return None;
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        tracing::warn!(
            "Discarding session snapshot with schema version {} (current {})",
            snapshot.version,
            SNAPSHOT_VERSION
        );
        return None;
    }
    if snapshot.user_id != user_id || snapshot.workout_id != workout_id {
        tracing::warn!("Discarding session snapshot with mismatched owner ids");
        return None;
    }
    Some(snapshot)
}
