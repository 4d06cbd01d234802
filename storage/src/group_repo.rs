//! Promo group repository, admin-scoped.
//!
//! Every lookup joins the admin table, so a user can only see or touch groups
//! they administer. Uses SqlitePoolManager and the PromoGroup model.

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::PromoGroup;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct GroupRepository {
    pool_manager: SqlitePoolManager,
}

impl GroupRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Groups administered by the user, oldest first.
    pub async fn list_for_admin(&self, user_id: i64) -> Result<Vec<PromoGroup>, StorageError> {
        let groups = sqlx::query_as::<_, PromoGroup>(
            r#"
            SELECT g.id, g.name, g.active, g.template, g.created_at, g.updated_at
            FROM promo_groups g
            JOIN promo_group_admins a ON a.promo_group_id = g.id
            WHERE a.user_id = ?
            ORDER BY g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;

        Ok(groups)
    }

    /// The group with this exact name among the user's groups, if any.
    pub async fn find_for_admin(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<PromoGroup>, StorageError> {
        let group = sqlx::query_as::<_, PromoGroup>(
            r#"
            SELECT g.id, g.name, g.active, g.template, g.created_at, g.updated_at
            FROM promo_groups g
            JOIN promo_group_admins a ON a.promo_group_id = g.id
            WHERE a.user_id = ? AND g.name = ?
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(group)
    }

    /// A group by id, still scoped to the administering user.
    pub async fn find_by_id_for_admin(
        &self,
        user_id: i64,
        group_id: i64,
    ) -> Result<Option<PromoGroup>, StorageError> {
        let group = sqlx::query_as::<_, PromoGroup>(
            r#"
            SELECT g.id, g.name, g.active, g.template, g.created_at, g.updated_at
            FROM promo_groups g
            JOIN promo_group_admins a ON a.promo_group_id = g.id
            WHERE a.user_id = ? AND g.id = ?
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(group)
    }

    /// Creates an inactive group with `admin_id` as its only admin. Fails with
    /// [`StorageError::AlreadyExists`] when the admin already has a group with
    /// that name.
    pub async fn create(&self, name: &str, admin_id: i64) -> Result<PromoGroup, StorageError> {
        if self.find_for_admin(admin_id, name).await?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Promo group \"{}\"",
                name
            )));
        }

        let now = Utc::now();
        let mut tx = self.pool_manager.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO promo_groups (name, active, template, created_at, updated_at)
            VALUES (?, 0, '', ?, ?)
            "#,
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let group_id = result.last_insert_rowid();

        sqlx::query(r#"INSERT INTO promo_group_admins (promo_group_id, user_id) VALUES (?, ?)"#)
            .bind(group_id)
            .bind(admin_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Created promo group: id={}, name={}", group_id, name);

        self.find_by_id_for_admin(admin_id, group_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Promo group {}", group_id)))
    }

    /// Renames a group.
    pub async fn rename(&self, group_id: i64, name: &str) -> Result<(), StorageError> {
        let result =
            sqlx::query(r#"UPDATE promo_groups SET name = ?, updated_at = ? WHERE id = ?"#)
                .bind(name)
                .bind(Utc::now())
                .bind(group_id)
                .execute(self.pool_manager.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Promo group {}", group_id)));
        }

        info!("Renamed promo group: id={}, name={}", group_id, name);
        Ok(())
    }

    /// Enables or disables a group.
    pub async fn set_active(&self, group_id: i64, active: bool) -> Result<(), StorageError> {
        let result =
            sqlx::query(r#"UPDATE promo_groups SET active = ?, updated_at = ? WHERE id = ?"#)
                .bind(active)
                .bind(Utc::now())
                .bind(group_id)
                .execute(self.pool_manager.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Promo group {}", group_id)));
        }

        info!("Set promo group active: id={}, active={}", group_id, active);
        Ok(())
    }

    /// Deletes a group. Admin links and participants go with it.
    pub async fn delete(&self, group_id: i64) -> Result<(), StorageError> {
        let result = sqlx::query(r#"DELETE FROM promo_groups WHERE id = ?"#)
            .bind(group_id)
            .execute(self.pool_manager.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Promo group {}", group_id)));
        }

        info!("Deleted promo group: id={}", group_id);
        Ok(())
    }
}
