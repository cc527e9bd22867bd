//! Session repository trait.
//!
//! Defines the interface for persisting the single in-progress session
//! document of an identity.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::identity::Identity;

/// An abstract store for the current session document.
///
/// The document is kept untyped at this boundary: stores may hand numbers
/// back as text, so callers run whatever they load through
/// [`crate::coercion::sanitize_session`].
///
/// # Implementation Notes
///
/// - `save_session` is a merge-style upsert: top-level keys of `data` replace
///   the stored ones, other keys survive.
/// - `load_session` returns `Ok(None)` when no document exists.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn save_session(&self, owner: &Identity, data: Value) -> Result<()>;

    async fn load_session(&self, owner: &Identity) -> Result<Option<Value>>;
}
