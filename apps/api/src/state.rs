use std::sync::Arc;

use crate::config::Config;
use crate::plants::generators::FieldGenerators;
use crate::plants::store::PlantStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable record store. Default: SqlitePlantStore.
    pub store: Arc<dyn PlantStore>,
    /// AI field generators; disabled when no Gemini key is configured.
    pub generators: FieldGenerators,
    pub config: Config,
}
