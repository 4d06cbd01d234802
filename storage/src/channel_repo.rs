//! Channel repository: Telegram channels the bot has seen.

use chrono::Utc;
use tracing::info;

use promobot_core::ChannelRef;

use crate::error::StorageError;
use crate::models::Channel;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ChannelRepository {
    pool_manager: SqlitePoolManager,
}

impl ChannelRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Inserts a channel or refreshes its username and title.
    pub async fn upsert(&self, channel: &ChannelRef) -> Result<Channel, StorageError> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO channels (id, username, title, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                title = excluded.title,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(channel.id)
        .bind(&channel.username)
        .bind(&channel.title)
        .bind(now)
        .bind(now)
        .execute(self.pool_manager.pool())
        .await?;

        info!("Upserted channel: id={}", channel.id);

        self.find(channel.id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Channel {}", channel.id)))
    }

    /// Looks up a channel by its chat id.
    pub async fn find(&self, id: i64) -> Result<Option<Channel>, StorageError> {
        let channel = sqlx::query_as::<_, Channel>(
            r#"SELECT id, username, title, created_at, updated_at FROM channels WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(channel)
    }
}
