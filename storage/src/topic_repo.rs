//! Topic repository: named topics for sorting a group's participants.

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::Topic;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct TopicRepository {
    pool_manager: SqlitePoolManager,
}

impl TopicRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Creates a topic in a group.
    pub async fn create(&self, promo_group_id: i64, name: &str) -> Result<Topic, StorageError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO topics (name, promo_group_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(promo_group_id)
        .bind(now)
        .bind(now)
        .execute(self.pool_manager.pool())
        .await?;

        let id = result.last_insert_rowid();
        info!(
            "Created topic: id={}, promo_group_id={}, name={}",
            id, promo_group_id, name
        );

        let topic = sqlx::query_as::<_, Topic>(
            r#"SELECT id, name, promo_group_id, created_at, updated_at FROM topics WHERE id = ?"#,
        )
        .bind(id)
        .fetch_one(self.pool_manager.pool())
        .await?;

        Ok(topic)
    }

    /// Topics of a group, oldest first.
    pub async fn list_for_group(&self, promo_group_id: i64) -> Result<Vec<Topic>, StorageError> {
        let topics = sqlx::query_as::<_, Topic>(
            r#"
            SELECT id, name, promo_group_id, created_at, updated_at
            FROM topics
            WHERE promo_group_id = ?
            ORDER BY id
            "#,
        )
        .bind(promo_group_id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(topics)
    }
}
