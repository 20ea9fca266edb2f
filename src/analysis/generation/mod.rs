//! Generation backends and the per-slot registry.

pub mod backend;
pub mod ollama;
pub mod registry;

pub use backend::{
    GenerateFuture, GenerationConstraints, GenerationRequest, GenerationTask, TextBackend,
};
pub use ollama::OllamaBackend;
pub use registry::{BackendBinding, BackendMethod, BackendRegistry};
