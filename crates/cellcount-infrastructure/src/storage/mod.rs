//! Storage helpers shared by the document stores.

pub mod atomic_json;

pub use atomic_json::AtomicJsonFile;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Key stamped onto every saved session document.
pub const LAST_UPDATED_KEY: &str = "lastUpdated";

/// Merge-style upsert of a session document.
///
/// Top-level keys of `incoming` replace the stored ones; keys only present in
/// the stored document survive. A non-object on either side is replaced
/// outright.
pub fn merge_session_document(existing: Option<Value>, incoming: Value, now: DateTime<Utc>) -> Value {
    let mut merged = match (existing, incoming) {
        (Some(Value::Object(mut stored)), Value::Object(update)) => {
            stored.extend(update);
            Value::Object(stored)
        }
        (_, incoming) => incoming,
    };
    if let Value::Object(map) = &mut merged {
        map.insert(LAST_UPDATED_KEY.to_string(), Value::String(now.to_rfc3339()));
    }
    merged
}
