//! Application layer for cell counting.
//!
//! This crate provides use case implementations that coordinate between
//! the domain and storage collaborators: debounced session sync, the history
//! subscription and the counting session itself.

pub mod history_feed;
pub mod lab_session_usecase;
pub mod notice;
pub mod session;

pub use history_feed::{HistorySubscription, subscribe_to_history};
pub use lab_session_usecase::LabSessionUseCase;
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use session::{SessionStart, SessionSync, start_session};
