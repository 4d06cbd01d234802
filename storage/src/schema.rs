//! Table and index creation for all storage modules.
//!
//! Called once at startup, before any repository runs a query.

use tracing::info;

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

/// Creates every table and index if it does not exist yet.
pub async fn init_schema(pool_manager: &SqlitePoolManager) -> Result<(), StorageError> {
    info!("Creating database tables if not exist");

    let pool = pool_manager.pool();

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS promo_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 0,
            template TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT,
            full_name TEXT NOT NULL DEFAULT '',
            menu TEXT NOT NULL DEFAULT 'main',
            scratch TEXT NOT NULL DEFAULT '',
            current_group_id INTEGER REFERENCES promo_groups(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS promo_group_admins (
            promo_group_id INTEGER NOT NULL REFERENCES promo_groups(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (promo_group_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channels (
            id INTEGER PRIMARY KEY,
            username TEXT,
            title TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            promo_group_id INTEGER NOT NULL REFERENCES promo_groups(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS participants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            channel_id INTEGER NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
            promo_group_id INTEGER NOT NULL REFERENCES promo_groups(id) ON DELETE CASCADE,
            active INTEGER NOT NULL DEFAULT 1,
            topic_id INTEGER REFERENCES topics(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (channel_id, promo_group_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_promo_group_admins_user_id ON promo_group_admins(user_id);
        CREATE INDEX IF NOT EXISTS idx_participants_promo_group_id ON participants(promo_group_id);
        CREATE INDEX IF NOT EXISTS idx_participants_channel_id ON participants(channel_id);
        CREATE INDEX IF NOT EXISTS idx_topics_promo_group_id ON topics(promo_group_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database tables created successfully");
    Ok(())
}
