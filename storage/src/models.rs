//! Business-entity models for promo-group management.
//!
//! Map to the `promo_groups`, `channels`, `participants` and `topics` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A promotion group. Created inactive with an empty template; promotion only
/// runs for active groups.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PromoGroup {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Telegram channel the bot has seen. Keyed by the channel's chat id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Channel {
    pub id: i64,
    pub username: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A channel's membership in a promo group. Each channel participates in a
/// group at most once.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    pub id: i64,
    pub channel_id: i64,
    pub promo_group_id: i64,
    pub active: bool,
    pub topic_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named topic within a promo group, for sorting participants.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub promo_group_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
