use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{CascadeSummary, Role, UserEntity};

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub role: Role,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: Option<UserEntity>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub user_id: Uuid,
    pub posts_deleted: u64,
    pub comments_deleted: u64,
}

impl DeleteUserResponse {
    pub fn new(user_id: Uuid, summary: CascadeSummary) -> Self {
        Self {
            user_id,
            posts_deleted: summary.posts_deleted,
            comments_deleted: summary.comments_deleted,
        }
    }
}
