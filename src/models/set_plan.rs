//! Per-set override plans.
//!
//! Set plans arrive as loosely-typed JSON (hand-edited payloads, template
//! catalogs, old exports), so every field is treated as untrusted: numeric
//! fields may be numbers or numeric strings, entries may be missing fields or
//! not be objects at all. Parsing never fails; non-conforming entries are
//! dropped and unusable numeric fields become "unset" so callers can apply
//! their own fallback chain (plan entry -> exercise scalar -> zero).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPlanEntry {
    /// 1-based set index.
    pub set: i64,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
}

/// Coerce a JSON value into an integer, accepting numeric strings.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// Coerce a JSON value into a finite float, accepting numeric strings.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Normalize a loosely-typed set plan into validated entries.
///
/// Non-object entries are discarded. Order is preserved, and entries missing a
/// `set` index get the next sequential index starting at 1.
pub fn parse(value: &Value) -> Vec<SetPlanEntry> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let Some(obj) = item.as_object() else {
            continue;
        };

        let set = obj
            .get("set")
            .and_then(coerce_i64)
            .unwrap_or(entries.len() as i64 + 1);

        entries.push(SetPlanEntry {
            set,
            reps: obj.get("reps").and_then(coerce_i64),
            weight: obj.get("weight").and_then(coerce_f64),
        });
    }
    entries
}

/// Parse a raw JSON string as stored in the `set_plan` column.
/// Malformed JSON yields an empty plan.
pub fn parse_raw(raw: &str) -> Vec<SetPlanEntry> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => parse(&value),
        Err(e) => {
            tracing::warn!("Discarding malformed set plan: {}", e);
            Vec::new()
        }
    }
}

/// Look up the plan entry for a 1-based set index.
pub fn entry_for_set(plan: &[SetPlanEntry], set_index: i64) -> Option<&SetPlanEntry> {
    plan.iter().find(|e| e.set == set_index)
}
