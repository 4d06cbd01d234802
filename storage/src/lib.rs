//! Storage crate: conversation-state persistence and promo-group repositories.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – PromoGroup, Channel, Participant, Topic
//! - [`schema`] – table and index creation
//! - [`sqlite_pool`] – SqlitePoolManager
//! - [`user_store`] – SqliteConversationStore (SQLite `ConversationStore`)
//! - [`group_repo`] – GroupRepository, admin-scoped promo group access
//! - [`channel_repo`] – ChannelRepository
//! - [`participant_repo`] – ParticipantRepository
//! - [`topic_repo`] – TopicRepository

mod channel_repo;
mod error;
mod group_repo;
mod models;
mod participant_repo;
mod schema;
mod sqlite_pool;
mod topic_repo;
mod user_store;


pub use channel_repo::ChannelRepository;
pub use error::StorageError;
pub use group_repo::GroupRepository;
pub use models::{Channel, Participant, PromoGroup, Topic};
pub use participant_repo::ParticipantRepository;
pub use schema::init_schema;
pub use sqlite_pool::SqlitePoolManager;
pub use topic_repo::TopicRepository;
pub use user_store::SqliteConversationStore;
