//! Session state and its persistence boundary.

pub mod model;
pub mod repository;

pub use model::{Confirmation, SessionState};
pub use repository::SessionRepository;
