pub mod coercion;
pub mod config;
pub mod counting;
pub mod error;
pub mod history;
pub mod identity;
pub mod results;
pub mod session;
pub mod volume;

// Re-export common error type
pub use error::LabError;
