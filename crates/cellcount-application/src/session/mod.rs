//! Session application services.
//!
//! Startup loading and the debounced writer that keeps the stored session
//! document in step with local edits.

mod bootstrap;
mod sync;

pub use bootstrap::{SessionStart, start_session};
pub use sync::SessionSync;
