//! User storage for the write-through summary cache.

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::analysis::core::config::StorageConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::ids::UserId;
use crate::analysis::core::language::Language;
use crate::analysis::core::record::UserRecord;
use crate::analysis::storage::conversation_store::timestamp_from_millis;
use crate::analysis::storage::StoreFuture;

/// User store trait.
pub trait UserStore: Send + Sync {
    /// Create a user row.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn create_user(&self) -> StoreFuture<'_, AnalysisResult<UserRecord>>;

    /// Get a user by id.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get_user(&self, user_id: UserId) -> StoreFuture<'_, AnalysisResult<Option<UserRecord>>>;

    /// Refresh the cached last-summary field for one language.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn set_last_summary(
        &self,
        user_id: UserId,
        language: Language,
        summary: String,
        at: DateTime<Utc>,
    ) -> StoreFuture<'_, AnalysisResult<()>>;
}

/// `SQLite` implementation of the user store.
pub struct SqliteUserStore {
    conn: Connection,
    table: String,
}

impl SqliteUserStore {
    /// Initialize the user store.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> AnalysisResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        let table = config.user_table.clone();
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    last_summary_en TEXT NOT NULL DEFAULT '',
                    last_summary_ar TEXT NOT NULL DEFAULT '',
                    last_analysis_at INTEGER,
                    created_at INTEGER NOT NULL
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self) -> StoreFuture<'_, AnalysisResult<UserRecord>> {
        Box::pin(async move {
            let table = self.table.clone();
            let created_ms = Utc::now().timestamp_millis();

            let id = self
                .conn
                .call(move |conn| {
                    conn.execute(
                        &format!("INSERT INTO {table} (created_at) VALUES (?1)"),
                        rusqlite::params![created_ms],
                    )?;
                    Ok(conn.last_insert_rowid())
                })
                .await?;

            Ok(UserRecord {
                id: UserId::new(id),
                last_summary_en: String::new(),
                last_summary_ar: String::new(),
                last_analysis_at: None,
            })
        })
    }

    fn get_user(&self, user_id: UserId) -> StoreFuture<'_, AnalysisResult<Option<UserRecord>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let row = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            &format!(
                                "SELECT last_summary_en, last_summary_ar, last_analysis_at
                                 FROM {table} WHERE id = ?1"
                            ),
                            rusqlite::params![user_id],
                            |row| {
                                let last_summary_en: String = row.get(0)?;
                                let last_summary_ar: String = row.get(1)?;
                                let last_analysis_ms: Option<i64> = row.get(2)?;
                                Ok((last_summary_en, last_summary_ar, last_analysis_ms))
                            },
                        )
                        .optional()?;
                    Ok(row)
                })
                .await?;

            let record = match row {
                Some((last_summary_en, last_summary_ar, last_analysis_ms)) => {
                    let last_analysis_at = match last_analysis_ms {
                        Some(ms) => Some(timestamp_from_millis(ms)?),
                        None => None,
                    };
                    Some(UserRecord {
                        id: user_id,
                        last_summary_en,
                        last_summary_ar,
                        last_analysis_at,
                    })
                }
                None => None,
            };

            Ok(record)
        })
    }

    fn set_last_summary(
        &self,
        user_id: UserId,
        language: Language,
        summary: String,
        at: DateTime<Utc>,
    ) -> StoreFuture<'_, AnalysisResult<()>> {
        Box::pin(async move {
            let table = self.table.clone();
            let column = match language {
                Language::En => "last_summary_en",
                Language::Ar => "last_summary_ar",
            };
            let at_ms = at.timestamp_millis();

            let updated = self
                .conn
                .call(move |conn| {
                    let updated = conn.execute(
                        &format!(
                            "UPDATE {table} SET {column} = ?2, last_analysis_at = ?3
                             WHERE id = ?1"
                        ),
                        rusqlite::params![user_id, summary, at_ms],
                    )?;
                    Ok(updated)
                })
                .await?;

            if updated == 0 {
                return Err(AnalysisError::NotFound(format!("user {user_id}")));
            }

            Ok(())
        })
    }
}
