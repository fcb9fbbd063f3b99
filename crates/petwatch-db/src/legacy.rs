//! One-time move from the single-companion layout to companions keyed by id.
//!
//! Older clients stored one bare companion record directly at
//! `users/{uid}/pets`. The current layout keeps a map of companion id to
//! record at the same path. [`migrate`] is pure and idempotent: a keyed map
//! comes back unchanged.

use serde_json::{Map, Value};

/// Result of [`migrate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Migration {
    /// Nothing stored, or already keyed. No write needed.
    Unchanged,
    /// The bare record was wrapped into a keyed map under `companion_id`.
    Migrated { keyed: Value, companion_id: String },
}

/// A bare companion record carries companion fields at the top level; a
/// keyed map only has companion ids there.
pub fn is_legacy(raw: &Value) -> bool {
    raw.as_object()
        .is_some_and(|map| map.get("species").is_some_and(Value::is_string))
}

/// Rewrite a legacy single-companion value into the keyed shape.
///
/// The record keeps its own `id` if it has one, otherwise `new_id` is called.
pub fn migrate(raw: Option<&Value>, new_id: impl FnOnce() -> String) -> Migration {
    let Some(raw) = raw.filter(|raw| is_legacy(raw)) else {
        return Migration::Unchanged;
    };

    let companion_id = raw
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .map(str::to_string)
        .unwrap_or_else(new_id);

    let mut record = raw.clone();
    if let Value::Object(fields) = &mut record {
        fields.insert("id".to_string(), Value::String(companion_id.clone()));
    }

    let mut keyed = Map::new();
    keyed.insert(companion_id.clone(), record);
    Migration::Migrated {
        keyed: Value::Object(keyed),
        companion_id,
    }
}
