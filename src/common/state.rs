use crate::cmr::{CmrClient, HttpCmrClient};
use crate::config::Config;
use crate::validator::{SchemaValidator, Validator};
use anyhow::Result;
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cmr: Arc<dyn CmrClient>,
    pub validator: Arc<dyn Validator>,
}

impl AppState {
    pub fn new(config: Config, cmr: Arc<dyn CmrClient>, validator: Arc<dyn Validator>) -> Self {
        Self {
            config,
            cmr,
            validator,
        }
    }

    /// State backed by the real CMR and the bundled STAC schemas.
    pub fn from_config(config: Config) -> Result<Self> {
        let cmr = Arc::new(HttpCmrClient::from_config(&config));
        let validator = Arc::new(SchemaValidator::new()?);
        Ok(Self::new(config, cmr, validator))
    }
}
