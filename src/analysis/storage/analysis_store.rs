//! Analysis record storage.

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::analysis::core::config::StorageConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::ids::{AnalysisId, ConversationId, UserId};
use crate::analysis::core::record::{AnalysisRecord, AnalysisStats, AnalysisStatus};
use crate::analysis::storage::conversation_store::timestamp_from_millis;
use crate::analysis::storage::StoreFuture;

/// Analysis record store trait.
pub trait AnalysisStore: Send + Sync {
    /// Insert a freshly created record.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn create(&self, record: AnalysisRecord) -> StoreFuture<'_, AnalysisResult<()>>;

    /// Persist the record's current state.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn update(&self, record: AnalysisRecord) -> StoreFuture<'_, AnalysisResult<()>>;

    /// Get a record by id, filtered by owner.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get(
        &self,
        analysis_id: AnalysisId,
        owner: UserId,
    ) -> StoreFuture<'_, AnalysisResult<Option<AnalysisRecord>>>;

    /// Count records owned by a user.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn count_for_user(&self, user_id: UserId) -> StoreFuture<'_, AnalysisResult<u64>>;
}

/// `SQLite` implementation of the analysis store.
pub struct SqliteAnalysisStore {
    conn: Connection,
    table: String,
}

impl SqliteAnalysisStore {
    /// Initialize the analysis store.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> AnalysisResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        let table = config.analysis_table.clone();
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    id TEXT PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    output_lang TEXT NOT NULL,
                    summary_en TEXT NOT NULL DEFAULT '',
                    summary_ar TEXT NOT NULL DEFAULT '',
                    total_conversations INTEGER NOT NULL DEFAULT 0,
                    total_interactions INTEGER NOT NULL DEFAULT 0,
                    total_user_messages INTEGER NOT NULL DEFAULT 0,
                    total_bot_messages INTEGER NOT NULL DEFAULT 0,
                    status TEXT NOT NULL,
                    error_message TEXT NOT NULL DEFAULT '',
                    conversation_ids TEXT NOT NULL DEFAULT '[]',
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{table_name}_user_created
                    ON {table_name} (user_id, created_at);
                CREATE INDEX IF NOT EXISTS idx_{table_name}_status
                    ON {table_name} (status);"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }
}

impl AnalysisStore for SqliteAnalysisStore {
    fn create(&self, record: AnalysisRecord) -> StoreFuture<'_, AnalysisResult<()>> {
        Box::pin(async move {
            let table = self.table.clone();
            let conversation_ids = serde_json::to_string(&record.conversation_ids)?;

            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT INTO {table}
                             (id, user_id, output_lang, summary_en, summary_ar,
                              total_conversations, total_interactions,
                              total_user_messages, total_bot_messages,
                              status, error_message, conversation_ids, created_at)
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                        ),
                        rusqlite::params![
                            record.id,
                            record.user_id,
                            record.output_lang.code(),
                            record.summary_en,
                            record.summary_ar,
                            record.stats.total_conversations,
                            record.stats.total_interactions,
                            record.stats.total_user_messages,
                            record.stats.total_bot_messages,
                            record.status.as_str(),
                            record.error_message,
                            conversation_ids,
                            record.created_at.timestamp_millis()
                        ],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn update(&self, record: AnalysisRecord) -> StoreFuture<'_, AnalysisResult<()>> {
        Box::pin(async move {
            let table = self.table.clone();
            let conversation_ids = serde_json::to_string(&record.conversation_ids)?;

            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "UPDATE {table} SET
                                summary_en = ?2, summary_ar = ?3,
                                total_conversations = ?4, total_interactions = ?5,
                                total_user_messages = ?6, total_bot_messages = ?7,
                                status = ?8, error_message = ?9, conversation_ids = ?10
                             WHERE id = ?1"
                        ),
                        rusqlite::params![
                            record.id,
                            record.summary_en,
                            record.summary_ar,
                            record.stats.total_conversations,
                            record.stats.total_interactions,
                            record.stats.total_user_messages,
                            record.stats.total_bot_messages,
                            record.status.as_str(),
                            record.error_message,
                            conversation_ids
                        ],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn get(
        &self,
        analysis_id: AnalysisId,
        owner: UserId,
    ) -> StoreFuture<'_, AnalysisResult<Option<AnalysisRecord>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let row = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            &format!(
                                "SELECT output_lang, summary_en, summary_ar,
                                        total_conversations, total_interactions,
                                        total_user_messages, total_bot_messages,
                                        status, error_message, conversation_ids, created_at
                                 FROM {table} WHERE id = ?1 AND user_id = ?2"
                            ),
                            rusqlite::params![analysis_id, owner],
                            |row| {
                                let output_lang: String = row.get(0)?;
                                let summary_en: String = row.get(1)?;
                                let summary_ar: String = row.get(2)?;
                                let total_conversations: u32 = row.get(3)?;
                                let total_interactions: u32 = row.get(4)?;
                                let total_user_messages: u32 = row.get(5)?;
                                let total_bot_messages: u32 = row.get(6)?;
                                let status: String = row.get(7)?;
                                let error_message: String = row.get(8)?;
                                let conversation_ids: String = row.get(9)?;
                                let created_ms: i64 = row.get(10)?;
                                Ok((
                                    output_lang,
                                    summary_en,
                                    summary_ar,
                                    AnalysisStats {
                                        total_conversations,
                                        total_interactions,
                                        total_user_messages,
                                        total_bot_messages,
                                    },
                                    status,
                                    error_message,
                                    conversation_ids,
                                    created_ms,
                                ))
                            },
                        )
                        .optional()?;
                    Ok(row)
                })
                .await?;

            let Some((
                output_lang,
                summary_en,
                summary_ar,
                stats,
                status,
                error_message,
                conversation_ids,
                created_ms,
            )) = row
            else {
                return Ok(None);
            };

            let output_lang = output_lang.parse().map_err(|value| {
                AnalysisError::InvalidRecord(format!("unknown language {value}"))
            })?;
            let status: AnalysisStatus = status.parse().map_err(|value| {
                AnalysisError::InvalidRecord(format!("unknown status {value}"))
            })?;
            let conversation_ids: Vec<ConversationId> = serde_json::from_str(&conversation_ids)?;

            Ok(Some(AnalysisRecord {
                id: analysis_id,
                user_id: owner,
                output_lang,
                summary_en,
                summary_ar,
                stats,
                status,
                error_message,
                conversation_ids,
                created_at: timestamp_from_millis(created_ms)?,
            }))
        })
    }

    fn count_for_user(&self, user_id: UserId) -> StoreFuture<'_, AnalysisResult<u64>> {
        Box::pin(async move {
            let table = self.table.clone();
            let count = self
                .conn
                .call(move |conn| {
                    let count: i64 = conn.query_row(
                        &format!("SELECT COUNT(*) FROM {table} WHERE user_id = ?1"),
                        rusqlite::params![user_id],
                        |row| row.get(0),
                    )?;
                    Ok(count)
                })
                .await?;

            u64::try_from(count)
                .map_err(|_| AnalysisError::InvalidRecord("negative row count".to_string()))
        })
    }
}
