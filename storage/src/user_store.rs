//! SQLite implementation of the conversation-state store.
//!
//! One row per Telegram user. Setters are single atomic UPDATEs keyed by the
//! user id, so concurrent writers never see a half-applied record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use promobot_core::{ChannelRef, ConversationStore, User, UserRecord, MAIN_MENU};

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: Option<String>,
    full_name: String,
    menu: String,
    scratch: String,
    current_group_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            menu: row.menu,
            scratch: row.scratch,
            current_group_id: row.current_group_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SQLite-backed [`ConversationStore`].
#[derive(Clone)]
pub struct SqliteConversationStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteConversationStore {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    async fn fetch_user(&self, id: i64) -> Result<Option<UserRecord>, StorageError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, full_name, menu, scratch, current_group_id, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn upsert(&self, user: &User) -> Result<UserRecord, StorageError> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, full_name, menu, scratch, current_group_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, '', NULL, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                full_name = excluded.full_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.full_name())
        .bind(MAIN_MENU)
        .bind(now)
        .bind(now)
        .execute(self.pool_manager.pool())
        .await?;

        info!("Upserted user: id={}", user.id);

        self.fetch_user(user.id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("User {}", user.id)))
    }

    async fn update_menu(&self, user_id: i64, menu: &str) -> Result<(), StorageError> {
        let result = sqlx::query(r#"UPDATE users SET menu = ?, updated_at = ? WHERE id = ?"#)
            .bind(menu)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        info!("Set menu: user_id={}, menu={}", user_id, menu);
        Ok(())
    }

    async fn update_scratch(&self, user_id: i64, scratch: &str) -> Result<(), StorageError> {
        let result = sqlx::query(r#"UPDATE users SET scratch = ?, updated_at = ? WHERE id = ?"#)
            .bind(scratch)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        debug!("Set scratch: user_id={}", user_id);
        Ok(())
    }

    async fn update_current_group(
        &self,
        user_id: i64,
        group_id: Option<i64>,
    ) -> Result<(), StorageError> {
        let result =
            sqlx::query(r#"UPDATE users SET current_group_id = ?, updated_at = ? WHERE id = ?"#)
                .bind(group_id)
                .bind(Utc::now())
                .bind(user_id)
                .execute(self.pool_manager.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        info!("Set current group: user_id={}, group_id={:?}", user_id, group_id);
        Ok(())
    }

    async fn fetch_channel(&self, chat_id: i64) -> Result<Option<ChannelRef>, StorageError> {
        let row: Option<(i64, Option<String>, Option<String>)> =
            sqlx::query_as(r#"SELECT id, username, title FROM channels WHERE id = ?"#)
                .bind(chat_id)
                .fetch_optional(self.pool_manager.pool())
                .await?;

        Ok(row.map(|(id, username, title)| ChannelRef {
            id,
            username,
            title,
        }))
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn find_user(&self, id: i64) -> promobot_core::Result<Option<UserRecord>> {
        Ok(self.fetch_user(id).await?)
    }

    async fn upsert_user(&self, user: &User) -> promobot_core::Result<UserRecord> {
        Ok(self.upsert(user).await?)
    }

    async fn set_menu(&self, user_id: i64, menu: &str) -> promobot_core::Result<()> {
        Ok(self.update_menu(user_id, menu).await?)
    }

    async fn set_scratch(&self, user_id: i64, scratch: &str) -> promobot_core::Result<()> {
        Ok(self.update_scratch(user_id, scratch).await?)
    }

    async fn set_current_group(
        &self,
        user_id: i64,
        group_id: Option<i64>,
    ) -> promobot_core::Result<()> {
        Ok(self.update_current_group(user_id, group_id).await?)
    }

    async fn known_channel(&self, chat_id: i64) -> promobot_core::Result<Option<ChannelRef>> {
        Ok(self.fetch_channel(chat_id).await?)
    }
}
