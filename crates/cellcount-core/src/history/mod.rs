//! Saved counts: record model, validation gate and storage boundary.

pub mod model;
pub mod repository;
pub mod validator;

pub use model::{HistoryRecord, sort_newest_first};
pub use repository::HistoryRepository;
pub use validator::{ValidationError, try_build_record};
