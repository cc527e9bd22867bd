//! Infrastructure layer for cell counting.
//!
//! Concrete collaborators for the application layer: document stores,
//! the local identity, configuration and environment resolution.

pub mod config_service;
pub mod environment;
pub mod identity_service;
pub mod json_file_store;
pub mod memory_store;
pub mod paths;
pub mod storage;

pub use config_service::{ConfigService, ResolvedConfig};
pub use environment::{AppEnvironment, EnvironmentMeta};
pub use identity_service::LocalIdentityProvider;
pub use json_file_store::JsonFileLabStore;
pub use memory_store::MemoryLabStore;
pub use paths::{LabPaths, StorageLayout};
