pub mod calc;
pub mod history;
pub mod render;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use cellcount_application::LabSessionUseCase;
use cellcount_infrastructure::{ConfigService, JsonFileLabStore, LocalIdentityProvider};

/// Opens the technician's session over the file store.
pub async fn open_session() -> Result<LabSessionUseCase> {
    let config = ConfigService::load().context("Failed to load configuration")?;
    let identity =
        LocalIdentityProvider::load_or_create().context("Failed to resolve local identity")?;
    let store = Arc::new(JsonFileLabStore::new(config.layout()));

    tracing::debug!("Data root: {}", store.layout().root().display());

    LabSessionUseCase::start(&identity, store.clone(), store, &config.settings)
        .await
        .context("Failed to start session")
}
