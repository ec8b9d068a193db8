use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{CascadeSummary, Role, UserEntity};
use crate::error::AppError;

pub const USER_NOT_FOUND: &str = "User not found";
pub const INCORRECT_PASSWORD: &str = "Incorrect password";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// 登录成功后签发的会话
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Users {
    One(UserEntity),
    Many(Vec<UserEntity>),
}

/// Results handed from one stage of a user request to the next.
#[derive(Debug, Default)]
pub struct UserContext {
    pub users: Option<Users>,
    pub session: Option<Session>,
    pub deleted: Option<CascadeSummary>,
}

/// A response that ends the request without reaching later stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: &'static str,
}

impl Rejection {
    pub fn unauthorized(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug)]
pub enum Flow {
    /// Continue with the (possibly enriched) context.
    Next(UserContext),
    /// Stop here and send the rejection.
    Halt(Rejection),
}

/// `Err` hands the failure to the centralized error response.
pub type Outcome = Result<Flow, AppError>;
