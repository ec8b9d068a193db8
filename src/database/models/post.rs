use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// 帖子实体，只保留与用户关联的字段
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostEntity {
    pub id: Uuid,
    pub user_id: Uuid,
}

/// 评论实体
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
}
