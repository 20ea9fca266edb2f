//! Persistence collaborators: store traits and their `SQLite` backends.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::analysis::core::config::StorageConfig;
use crate::analysis::core::errors::AnalysisResult;

pub mod analysis_store;
pub mod conversation_store;
pub mod user_store;

pub use analysis_store::{AnalysisStore, SqliteAnalysisStore};
pub use conversation_store::{ConversationStore, SqliteConversationStore};
pub use user_store::{SqliteUserStore, UserStore};

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Store dependencies for the analysis pipelines.
#[derive(Clone)]
pub struct AnalysisStores {
    /// Conversation and line store implementation.
    pub conversations: Arc<dyn ConversationStore>,
    /// Analysis record store implementation.
    pub analyses: Arc<dyn AnalysisStore>,
    /// User store implementation.
    pub users: Arc<dyn UserStore>,
}

impl AnalysisStores {
    /// Build default `SQLite` stores from config.
    ///
    /// # Errors
    /// Returns an error if any store cannot be initialized.
    pub async fn sqlite(config: &StorageConfig) -> AnalysisResult<Self> {
        let conversations = Arc::new(SqliteConversationStore::new(config).await?);
        let analyses = Arc::new(SqliteAnalysisStore::new(config).await?);
        let users = Arc::new(SqliteUserStore::new(config).await?);

        Ok(Self {
            conversations,
            analyses,
            users,
        })
    }
}
