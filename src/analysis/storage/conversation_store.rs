//! Conversation and dialogue-line storage.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::analysis::core::config::StorageConfig;
use crate::analysis::core::errors::{AnalysisError, AnalysisResult};
use crate::analysis::core::ids::{ConversationId, UserId};
use crate::analysis::core::record::{ConversationRecord, ConversationTitle};
use crate::analysis::storage::StoreFuture;
use crate::analysis::transcript::line::{DialogueLine, DialogueRole};

/// Conversation store trait.
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation owned by a user.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn create_conversation(
        &self,
        user_id: UserId,
    ) -> StoreFuture<'_, AnalysisResult<ConversationRecord>>;

    /// Get a conversation by id, filtered by owner.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get_conversation(
        &self,
        conversation_id: ConversationId,
        owner: UserId,
    ) -> StoreFuture<'_, AnalysisResult<Option<ConversationRecord>>>;

    /// Append a dialogue line to its conversation.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn append_line(&self, line: DialogueLine) -> StoreFuture<'_, AnalysisResult<()>>;

    /// Load all lines of a conversation in chronological order.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list_lines(
        &self,
        conversation_id: ConversationId,
    ) -> StoreFuture<'_, AnalysisResult<Vec<DialogueLine>>>;

    /// Load the most recent lines of a conversation, newest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn load_recent_lines(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> StoreFuture<'_, AnalysisResult<Vec<DialogueLine>>>;

    /// Overwrite both title fields in a single update.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn update_titles(
        &self,
        conversation_id: ConversationId,
        title: ConversationTitle,
    ) -> StoreFuture<'_, AnalysisResult<()>>;

    /// Count conversations owned by a user.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn count_for_user(&self, user_id: UserId) -> StoreFuture<'_, AnalysisResult<u64>>;
}

/// `SQLite` implementation of conversation storage.
pub struct SqliteConversationStore {
    conn: Connection,
    conversation_table: String,
    line_table: String,
}

impl SqliteConversationStore {
    /// Initialize the conversation store.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> AnalysisResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        let conversation_table = config.conversation_table.clone();
        let line_table = config.line_table.clone();
        let conversations = conversation_table.clone();
        let lines = line_table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {conversations} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    title_en TEXT NOT NULL DEFAULT '',
                    title_ar TEXT NOT NULL DEFAULT '',
                    created_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS {lines} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    conversation_id INTEGER NOT NULL,
                    role TEXT NOT NULL,
                    text_en TEXT NOT NULL,
                    text_ar TEXT NOT NULL,
                    ts INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{lines}_conversation_ts
                    ON {lines} (conversation_id, ts);"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            conversation_table,
            line_table,
        })
    }

    async fn load_lines(
        &self,
        conversation_id: ConversationId,
        order: &'static str,
        limit: Option<usize>,
    ) -> AnalysisResult<Vec<DialogueLine>> {
        let table = self.line_table.clone();
        let limit_clause = limit.map_or(String::new(), |n| format!(" LIMIT {n}"));

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT role, text_en, text_ar, ts FROM {table}
                     WHERE conversation_id = ?1 ORDER BY ts {order}, id {order}{limit_clause}"
                ))?;
                let rows = stmt
                    .query_map(rusqlite::params![conversation_id], |row| {
                        let role: String = row.get(0)?;
                        let text_en: String = row.get(1)?;
                        let text_ar: String = row.get(2)?;
                        let ts: i64 = row.get(3)?;
                        Ok((role, text_en, text_ar, ts))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for (role, text_en, text_ar, ts) in rows {
            let role: DialogueRole = role
                .parse()
                .map_err(|value| AnalysisError::InvalidRecord(format!("unknown role {value}")))?;
            lines.push(DialogueLine {
                conversation_id,
                role,
                text_en,
                text_ar,
                created_at: timestamp_from_millis(ts)?,
            });
        }

        Ok(lines)
    }
}

impl ConversationStore for SqliteConversationStore {
    fn create_conversation(
        &self,
        user_id: UserId,
    ) -> StoreFuture<'_, AnalysisResult<ConversationRecord>> {
        Box::pin(async move {
            let table = self.conversation_table.clone();
            let created_at = Utc::now();
            let created_ms = created_at.timestamp_millis();

            let id = self
                .conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT INTO {table} (user_id, created_at) VALUES (?1, ?2)"
                        ),
                        rusqlite::params![user_id, created_ms],
                    )?;
                    Ok(conn.last_insert_rowid())
                })
                .await?;

            Ok(ConversationRecord {
                id: ConversationId::new(id),
                user_id,
                title: ConversationTitle::default(),
                created_at,
            })
        })
    }

    fn get_conversation(
        &self,
        conversation_id: ConversationId,
        owner: UserId,
    ) -> StoreFuture<'_, AnalysisResult<Option<ConversationRecord>>> {
        Box::pin(async move {
            let table = self.conversation_table.clone();
            let row = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            &format!(
                                "SELECT title_en, title_ar, created_at FROM {table}
                                 WHERE id = ?1 AND user_id = ?2"
                            ),
                            rusqlite::params![conversation_id, owner],
                            |row| {
                                let title_en: String = row.get(0)?;
                                let title_ar: String = row.get(1)?;
                                let created_ms: i64 = row.get(2)?;
                                Ok((title_en, title_ar, created_ms))
                            },
                        )
                        .optional()?;
                    Ok(row)
                })
                .await?;

            let record = match row {
                Some((title_en, title_ar, created_ms)) => Some(ConversationRecord {
                    id: conversation_id,
                    user_id: owner,
                    title: ConversationTitle { title_en, title_ar },
                    created_at: timestamp_from_millis(created_ms)?,
                }),
                None => None,
            };

            Ok(record)
        })
    }

    fn append_line(&self, line: DialogueLine) -> StoreFuture<'_, AnalysisResult<()>> {
        Box::pin(async move {
            let table = self.line_table.clone();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT INTO {table} (conversation_id, role, text_en, text_ar, ts)
                             VALUES (?1, ?2, ?3, ?4, ?5)"
                        ),
                        rusqlite::params![
                            line.conversation_id,
                            line.role.as_str(),
                            line.text_en,
                            line.text_ar,
                            line.created_at.timestamp_millis()
                        ],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn list_lines(
        &self,
        conversation_id: ConversationId,
    ) -> StoreFuture<'_, AnalysisResult<Vec<DialogueLine>>> {
        Box::pin(self.load_lines(conversation_id, "ASC", None))
    }

    fn load_recent_lines(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> StoreFuture<'_, AnalysisResult<Vec<DialogueLine>>> {
        Box::pin(self.load_lines(conversation_id, "DESC", Some(limit)))
    }

    fn update_titles(
        &self,
        conversation_id: ConversationId,
        title: ConversationTitle,
    ) -> StoreFuture<'_, AnalysisResult<()>> {
        Box::pin(async move {
            let table = self.conversation_table.clone();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "UPDATE {table} SET title_en = ?2, title_ar = ?3 WHERE id = ?1"
                        ),
                        rusqlite::params![conversation_id, title.title_en, title.title_ar],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn count_for_user(&self, user_id: UserId) -> StoreFuture<'_, AnalysisResult<u64>> {
        Box::pin(async move {
            let table = self.conversation_table.clone();
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

/// Convert stored millisecond timestamps back to UTC datetimes.
pub(crate) fn timestamp_from_millis(ms: i64) -> AnalysisResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| AnalysisError::InvalidRecord(format!("invalid timestamp {ms}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> SqliteConversationStore {
        let mut config = StorageConfig::default();
        config.sqlite_path =
            std::env::temp_dir().join(format!("lisan-store-{}.sqlite", uuid::Uuid::new_v4()));
        SqliteConversationStore::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_recent_lines_are_newest_first_and_windowed() {
        let store = temp_store().await;
        let user = UserId::new(5);
        let conversation = store.create_conversation(user).await.unwrap();

        for i in 0..8i64 {
            let mut line =
                DialogueLine::user(conversation.id, format!("message {i}"), format!("رسالة {i}"));
            line.created_at += chrono::Duration::milliseconds(i);
            store.append_line(line).await.unwrap();
        }

        let recent = store.load_recent_lines(conversation.id, 6).await.unwrap();
        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].text_en, "message 7");
        assert_eq!(recent[5].text_en, "message 2");

        let all = store.list_lines(conversation.id).await.unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0].text_en, "message 0");
    }

    #[tokio::test]
    async fn test_update_titles_and_count() {
        let store = temp_store().await;
        let user = UserId::new(9);
        let first = store.create_conversation(user).await.unwrap();
        let _second = store.create_conversation(user).await.unwrap();

        assert_eq!(store.count_for_user(user).await.unwrap(), 2);
        assert_eq!(store.count_for_user(UserId::new(1)).await.unwrap(), 0);

        store
            .update_titles(
                first.id,
                ConversationTitle {
                    title_en: "Trip".to_string(),
                    title_ar: "رحلة".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = store.get_conversation(first.id, user).await.unwrap().unwrap();
        assert_eq!(stored.title.title_en, "Trip");
        assert_eq!(stored.title.title_ar, "رحلة");

        // Owner filtering hides the row from other users.
        assert!(store
            .get_conversation(first.id, UserId::new(1))
            .await
            .unwrap()
            .is_none());
    }
}
