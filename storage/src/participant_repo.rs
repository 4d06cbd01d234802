//! Participant repository: channel membership in promo groups.

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::Participant;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ParticipantRepository {
    pool_manager: SqlitePoolManager,
}

impl ParticipantRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Adds a channel to a group, active and without a topic. Fails with
    /// [`StorageError::AlreadyExists`] when the channel already participates
    /// in that group.
    pub async fn add(
        &self,
        channel_id: i64,
        promo_group_id: i64,
    ) -> Result<Participant, StorageError> {
        if self.find(channel_id, promo_group_id).await?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Channel {} in promo group {}",
                channel_id, promo_group_id
            )));
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO participants (channel_id, promo_group_id, active, topic_id, created_at, updated_at)
            VALUES (?, ?, 1, NULL, ?, ?)
            "#,
        )
        .bind(channel_id)
        .bind(promo_group_id)
        .bind(now)
        .bind(now)
        .execute(self.pool_manager.pool())
        .await?;

        info!(
            "Added participant: id={}, channel_id={}, promo_group_id={}",
            result.last_insert_rowid(),
            channel_id,
            promo_group_id
        );

        self.find(channel_id, promo_group_id)
            .await?
            .ok_or_else(|| {
                StorageError::NotFound(format!(
                    "Channel {} in promo group {}",
                    channel_id, promo_group_id
                ))
            })
    }

    /// The participant row for a channel in a group, if any.
    pub async fn find(
        &self,
        channel_id: i64,
        promo_group_id: i64,
    ) -> Result<Option<Participant>, StorageError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, channel_id, promo_group_id, active, topic_id, created_at, updated_at
            FROM participants
            WHERE channel_id = ? AND promo_group_id = ?
            "#,
        )
        .bind(channel_id)
        .bind(promo_group_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(participant)
    }

    /// All participants of a group, oldest first.
    pub async fn list_for_group(
        &self,
        promo_group_id: i64,
    ) -> Result<Vec<Participant>, StorageError> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, channel_id, promo_group_id, active, topic_id, created_at, updated_at
            FROM participants
            WHERE promo_group_id = ?
            ORDER BY id
            "#,
        )
        .bind(promo_group_id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(participants)
    }

    /// Assigns or clears a participant's topic.
    pub async fn set_topic(
        &self,
        participant_id: i64,
        topic_id: Option<i64>,
    ) -> Result<(), StorageError> {
        let result =
            sqlx::query(r#"UPDATE participants SET topic_id = ?, updated_at = ? WHERE id = ?"#)
                .bind(topic_id)
                .bind(Utc::now())
                .bind(participant_id)
                .execute(self.pool_manager.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "Participant {}",
                participant_id
            )));
        }

        info!(
            "Set participant topic: id={}, topic_id={:?}",
            participant_id, topic_id
        );
        Ok(())
    }
}
