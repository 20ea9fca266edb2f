//! Analysis pipelines and their shared bootstrap.

use std::sync::Arc;

use crate::analysis::core::config::AssistantConfig;
use crate::analysis::core::errors::AnalysisResult;
use crate::analysis::generation::registry::BackendRegistry;
use crate::analysis::storage::AnalysisStores;

pub mod summary;
pub mod title;

pub use summary::{AnalysisInput, SummaryPipeline};
pub use title::TitlePipeline;

/// Both pipelines wired over one registry and one store set.
///
/// Construct this once at process start and share it; the registry inside
/// resolves its backends exactly once, at construction.
pub struct AnalysisService {
    /// Long-form summary pipeline.
    pub summaries: SummaryPipeline,
    /// Per-conversation title pipeline.
    pub titles: TitlePipeline,
}

impl AnalysisService {
    /// Wire both pipelines from explicit dependencies.
    ///
    /// # Errors
    /// Returns an error if configuration-derived components fail to build.
    pub fn new(
        config: &AssistantConfig,
        registry: Arc<BackendRegistry>,
        stores: AnalysisStores,
    ) -> AnalysisResult<Self> {
        Ok(Self {
            summaries: SummaryPipeline::new(config, registry.clone(), stores.clone())?,
            titles: TitlePipeline::new(config, registry, stores)?,
        })
    }

    /// Build a service with `SQLite` stores and Ollama backends from config.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or storage cannot be
    /// initialized.
    pub async fn from_config(config: &AssistantConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let stores = AnalysisStores::sqlite(&config.storage).await?;
        let registry = Arc::new(BackendRegistry::initialize(&config.generation));
        Self::new(config, registry, stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_service_bootstraps_from_config() {
        let mut config = AssistantConfig::default();
        config.storage.sqlite_path =
            std::env::temp_dir().join(format!("lisan-service-{}.sqlite", uuid::Uuid::new_v4()));

        assert!(AnalysisService::from_config(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = AssistantConfig::default();
        config.generation.timeout_seconds = 0;

        assert!(AnalysisService::from_config(&config).await.is_err());
    }
}
