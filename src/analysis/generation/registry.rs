//! Backend registry: one resolved generation backend per (task, language).
//!
//! Resolution happens once, at construction: each slot walks an ordered
//! candidate list — the configured specialized model first, then the general
//! multilingual model — and keeps the first backend that initializes. The
//! registry is immutable afterwards and shared behind `Arc`, so construct it
//! once at process start and inject it into the pipelines.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::analysis::core::config::GenerationConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::language::Language;
use crate::analysis::generation::backend::{GenerationRequest, GenerationTask, TextBackend};
use crate::analysis::generation::ollama::OllamaBackend;

/// Which resolution path produced a slot's backend.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackendMethod {
    /// A model configured specifically for the slot.
    Specialized,
    /// The shared multilingual model.
    General,
}

impl BackendMethod {
    /// Stable string form for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Specialized => "specialized",
            Self::General => "general",
        }
    }
}

impl fmt::Display for BackendMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved backend plus the method that produced it, fixed for the
/// process lifetime.
pub struct BackendBinding {
    /// Resolution path that won at initialization.
    pub method: BackendMethod,
    backend: Arc<dyn TextBackend>,
}

impl BackendBinding {
    /// Bind a backend to its resolution method.
    #[must_use]
    pub fn new(method: BackendMethod, backend: Arc<dyn TextBackend>) -> Self {
        Self { method, backend }
    }

    /// The bound backend.
    #[must_use]
    pub fn backend(&self) -> &dyn TextBackend {
        self.backend.as_ref()
    }
}

/// Process-wide mapping from (task, language) to a generation backend.
pub struct BackendRegistry {
    slots: HashMap<(GenerationTask, Language), BackendBinding>,
    call_timeout: Duration,
}

impl BackendRegistry {
    /// Resolve every (task, language) slot from configuration.
    ///
    /// Failure to initialize one candidate, or even a whole slot, never
    /// prevents the other slots from becoming available; the chosen path is
    /// logged per slot for observability.
    #[must_use]
    pub fn initialize(config: &GenerationConfig) -> Self {
        let mut slots = HashMap::new();

        for task in GenerationTask::ALL {
            for language in Language::ALL {
                match resolve_slot(config, task, language) {
                    Some(binding) => {
                        info!(
                            "Using {} backend {} for {}/{}",
                            binding.method,
                            binding.backend().model_name(),
                            task,
                            language
                        );
                        slots.insert((task, language), binding);
                    }
                    None => {
                        warn!("No generation backend available for {task}/{language}");
                    }
                }
            }
        }

        Self {
            slots,
            call_timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Build a registry from explicit bindings.
    ///
    /// Intended for wiring non-Ollama backends and for tests.
    #[must_use]
    pub fn from_bindings(
        bindings: Vec<((GenerationTask, Language), BackendBinding)>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            slots: bindings.into_iter().collect(),
            call_timeout,
        }
    }

    /// Resolved binding for a slot.
    ///
    /// # Errors
    /// Returns [`AnalysisError::BackendUnavailable`] if no backend could be
    /// initialized for the slot; that state lasts until process restart.
    pub fn get(&self, task: GenerationTask, language: Language) -> AnalysisResult<&BackendBinding> {
        self.slots
            .get(&(task, language))
            .ok_or(AnalysisError::BackendUnavailable { task, language })
    }

    /// Run one generation call on the slot's backend.
    ///
    /// # Errors
    /// Returns [`AnalysisError::BackendUnavailable`] for an uninitialized
    /// slot, and [`AnalysisError::Generation`] wrapping every backend-level
    /// failure, including expiry of the configured wall-clock budget.
    pub async fn generate(
        &self,
        task: GenerationTask,
        language: Language,
        request: GenerationRequest,
    ) -> AnalysisResult<String> {
        let binding = self.get(task, language)?;

        match timeout(self.call_timeout, binding.backend().generate(request)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(AnalysisError::Generation(message))) => Err(AnalysisError::Generation(message)),
            Ok(Err(err)) => Err(AnalysisError::Generation(err.to_string())),
            Err(_) => Err(AnalysisError::Generation(format!(
                "generation timed out after {}s",
                self.call_timeout.as_secs()
            ))),
        }
    }
}

/// Walk a slot's candidate list and keep the first backend that builds.
fn resolve_slot(
    config: &GenerationConfig,
    task: GenerationTask,
    language: Language,
) -> Option<BackendBinding> {
    let mut candidates = Vec::new();
    if let Some(model) = config.specialized_model(task, language) {
        candidates.push((BackendMethod::Specialized, model.to_string()));
    }
    candidates.push((BackendMethod::General, config.general_model.clone()));

    for (method, model) in candidates {
        match OllamaBackend::new(config, &model) {
            Ok(backend) => {
                return Some(BackendBinding::new(method, Arc::new(backend)));
            }
            Err(err) => {
                warn!("Failed to initialize {method} backend {model} for {task}/{language}: {err}");
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::generation::backend::{GenerateFuture, GenerationConstraints};

    struct FixedBackend(&'static str);

    impl TextBackend for FixedBackend {
        fn model_name(&self) -> &str {
            "fixed"
        }

        fn generate(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            let output = self.0.to_string();
            Box::pin(async move { Ok(output) })
        }
    }

    struct FailingBackend;

    impl TextBackend for FailingBackend {
        fn model_name(&self) -> &str {
            "failing"
        }

        fn generate(&self, _request: GenerationRequest) -> GenerateFuture<'_> {
            Box::pin(async move { Err(AnalysisError::Generation("model crashed".to_string())) })
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            text: "User: hello".to_string(),
            language: Language::En,
            task: GenerationTask::Summary,
            constraints: GenerationConstraints {
                max_output_chars: 100,
                min_output_chars: 1,
            },
        }
    }

    #[tokio::test]
    async fn test_missing_slot_is_unavailable() {
        let registry = BackendRegistry::from_bindings(Vec::new(), Duration::from_secs(5));
        let err = registry
            .generate(GenerationTask::Summary, Language::En, request())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::BackendUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_generate_returns_backend_text() {
        let binding = BackendBinding::new(BackendMethod::General, Arc::new(FixedBackend("hi")));
        let registry = BackendRegistry::from_bindings(
            vec![((GenerationTask::Summary, Language::En), binding)],
            Duration::from_secs(5),
        );

        let text = registry
            .generate(GenerationTask::Summary, Language::En, request())
            .await
            .unwrap();
        assert_eq!(text, "hi");
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_generation_error() {
        let binding = BackendBinding::new(BackendMethod::Specialized, Arc::new(FailingBackend));
        let registry = BackendRegistry::from_bindings(
            vec![((GenerationTask::Summary, Language::En), binding)],
            Duration::from_secs(5),
        );

        let err = registry
            .generate(GenerationTask::Summary, Language::En, request())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Generation(message) if message.contains("crashed")));
    }

    #[test]
    fn test_initialize_fills_every_slot() {
        let registry = BackendRegistry::initialize(&GenerationConfig::default());
        for task in GenerationTask::ALL {
            for language in Language::ALL {
                let binding = registry.get(task, language).unwrap();
                assert_eq!(binding.method, BackendMethod::General);
            }
        }
    }

    #[test]
    fn test_specialized_model_wins_when_configured() {
        let mut config = GenerationConfig::default();
        config.summary_ar_model = Some("mt5-xlsum".to_string());
        let registry = BackendRegistry::initialize(&config);

        let binding = registry.get(GenerationTask::Summary, Language::Ar).unwrap();
        assert_eq!(binding.method, BackendMethod::Specialized);
        assert_eq!(binding.backend().model_name(), "mt5-xlsum");

        let other = registry.get(GenerationTask::Summary, Language::En).unwrap();
        assert_eq!(other.method, BackendMethod::General);
    }
}
