//! Application state.

use std::sync::Arc;

use anyhow::Context;
use mrelay_media::MediaConfig;
use mrelay_models::KeyRules;
use mrelay_storage::{ObjectStore, Publisher, R2Client, R2Config};
use mrelay_worker::Orchestrator;
use tracing::info;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<dyn ObjectStore>,
    pub publisher: Publisher,
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Create state from environment configuration.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let media = MediaConfig::from_env();
        let r2 = R2Config::from_env().context("R2 configuration")?;

        let storage: Arc<dyn ObjectStore> = Arc::new(R2Client::new(&r2));
        let publisher = Publisher::new(storage, r2.public_base_url.clone());

        let key_rules =
            KeyRules::parse(&std::env::var("KEY_TERM_REPLACEMENTS").unwrap_or_default());
        info!(
            ffmpeg = %media.ffmpeg_path.display(),
            work_dir = %media.work_dir.display(),
            bucket = %r2.bucket_name,
            key_rules = key_rules.len(),
            "Media configuration loaded"
        );

        let orchestrator = Orchestrator::from_config(&media, publisher.clone(), key_rules)
            .context("building job orchestrator")?;

        Ok(Self::from_parts(config, orchestrator))
    }

    /// Assemble state around an existing orchestrator.
    pub fn from_parts(config: ApiConfig, orchestrator: Orchestrator) -> Self {
        let publisher = orchestrator.publisher().clone();
        Self {
            config,
            storage: publisher.store().clone(),
            publisher,
            orchestrator,
        }
    }
}
