// 数据库模块
// 包含实体定义、存储抽象以及 Postgres / 内存两种实现

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use models::{CommentEntity, NewUser, PostEntity, Role, UserEntity};
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("datastore unavailable")]
    Unavailable,
}

/// 级联删除的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSummary {
    pub posts_deleted: u64,
    pub comments_deleted: u64,
}

/// 用户、帖子、评论三个集合上的存储操作
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError>;

    async fn find_users(&self) -> Result<Vec<UserEntity>, StoreError>;

    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserEntity, StoreError>;

    /// Removes the user and every post and comment carrying its id.
    ///
    /// Returns `None` when no user with that id exists; nothing is removed
    /// in that case.
    async fn delete_user_cascade(&self, user_id: Uuid)
    -> Result<Option<CascadeSummary>, StoreError>;
}
