//! Ollama-backed text generation through Rig.

use reqwest::Client as ReqwestClient;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;
use tracing::debug;

use crate::analysis::core::config::GenerationConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::generation::backend::{
    GenerateFuture, GenerationRequest, GenerationTask, TextBackend,
};
use crate::analysis::quality::truncate::truncate_to_chars;

/// System prompt for summary generation.
const SUMMARY_PREAMBLE: &str = "You summarize conversations between a user and an assistant. \
Write plain text in the requested language, without headings, lists, or commentary.";

/// System prompt for title generation.
const TITLE_PREAMBLE: &str = "You name conversations between a user and an assistant. \
Reply with a short plain-text phrase in the requested language and nothing else.";

/// Text backend over a local Ollama completion model.
pub struct OllamaBackend {
    model: ollama::CompletionModel,
    model_name: String,
    temperature: f64,
}

impl OllamaBackend {
    /// Create a backend bound to one Ollama model.
    ///
    /// # Errors
    /// Returns an error if the Ollama client cannot be built.
    pub fn new(config: &GenerationConfig, model_name: &str) -> AnalysisResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(rig::client::Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(AnalysisError::from)?;
        let model = client.completion_model(model_name.to_string());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
            temperature: config.temperature,
        })
    }
}

impl TextBackend for OllamaBackend {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate(&self, request: GenerationRequest) -> GenerateFuture<'_> {
        Box::pin(async move {
            let profile = request.language.profile();
            let (instruction, preamble) = match request.task {
                GenerationTask::Summary => (profile.summary_instruction, SUMMARY_PREAMBLE),
                GenerationTask::Title => (profile.title_instruction, TITLE_PREAMBLE),
            };
            let prompt = format!("{instruction}\n\n{}", request.text);

            debug!(
                "Generating {} in {} with model {}",
                request.task, request.language, self.model_name
            );

            let completion_request = self
                .model
                .completion_request(prompt)
                .preamble(preamble.to_string())
                .temperature(self.temperature)
                .build();

            let response = self.model.completion(completion_request).await?;
            let text = extract_text(&response.choice);
            Ok(truncate_to_chars(&text, request.constraints.max_output_chars))
        })
    }
}

/// Extract text from assistant response.
fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}
