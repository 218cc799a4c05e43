use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Deserializer, Serialize};

use super::set_plan::{self, SetPlanEntry};
use super::FromSqliteRow;

/// Deserialize an optional integer from a form field.
/// Handles empty strings by returning None instead of failing.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Same as above for floating-point form fields.
fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub workout_id: String,
    pub name: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub rest_seconds: i64,
    pub order_index: i64,
    /// Raw per-set override JSON as stored; parsed on demand.
    pub set_plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Parsed set plan, empty when absent or malformed.
    pub fn plan(&self) -> Vec<SetPlanEntry> {
        self.set_plan
            .as_deref()
            .map(set_plan::parse_raw)
            .unwrap_or_default()
    }
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_id: row.get("workout_id")?,
            name: row.get("name")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight: row.get("weight")?,
            rest_seconds: row.get("rest_seconds")?,
            order_index: row.get("order_index")?,
            set_plan: row.get("set_plan")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateExercise {
    pub name: String,
    pub sets: i64,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub reps: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub rest_seconds: Option<i64>,
    pub set_plan: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExercise {
    pub name: String,
    pub sets: i64,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub reps: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub rest_seconds: Option<i64>,
    pub set_plan: Option<String>,
}
