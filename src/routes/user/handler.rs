use axum::{
    extract::{Extension, Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::{
    AppState,
    error::AppError,
    user::{Credentials, Flow, NewAccount, Outcome, UserContext, Users},
    utils::{Claims, session_cookie, success_to_api_response},
};

use super::model::{CreateUserResponse, DeleteUserRequest, DeleteUserResponse, LoginResponse};

/// 根据处理结果生成响应：继续则渲染数据并写入会话 cookie，中止则返回拒绝信息
fn proceed<T, F>(outcome: Outcome, jar: CookieJar, render: F) -> Response
where
    T: Serialize,
    F: FnOnce(UserContext) -> T,
{
    match outcome {
        Ok(Flow::Next(ctx)) => {
            let jar = match ctx.session.as_ref() {
                Some(session) => jar.add(session_cookie(session.token.clone())),
                None => jar,
            };
            (jar, success_to_api_response(render(ctx))).into_response()
        }
        Ok(Flow::Halt(rejection)) => rejection.into_response(),
        Err(e) => e.into_response(),
    }
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<NewAccount>,
) -> Response {
    let outcome = state.users().create_user(UserContext::default(), req).await;

    proceed(outcome, jar, |ctx| CreateUserResponse {
        user: match ctx.users {
            Some(Users::One(user)) => Some(user),
            _ => None,
        },
        expires_at: ctx.session.map(|s| s.expires_at),
    })
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<Credentials>,
) -> Response {
    let outcome = state.users().find_user(UserContext::default(), &req).await;

    proceed(outcome, jar, |ctx| {
        ctx.session.map(|s| LoginResponse {
            user_id: s.user_id,
            role: s.role,
            expires_at: s.expires_at,
        })
    })
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>, jar: CookieJar) -> Response {
    let outcome = state.users().get_all_users(UserContext::default()).await;

    proceed(outcome, jar, |ctx| {
        ctx.users.unwrap_or_else(|| Users::Many(Vec::new()))
    })
}

#[axum::debug_handler]
pub async fn delete_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<DeleteUserRequest>,
) -> Response {
    // 只能删除自己，管理员除外
    if !claims.may_manage(req.user_id) {
        tracing::warn!("User {} may not delete user {}", claims.id, req.user_id);
        return AppError::Forbidden.into_response();
    }

    let outcome = state
        .users()
        .delete_user(UserContext::default(), req.user_id)
        .await;

    proceed(outcome, jar, |ctx| {
        DeleteUserResponse::new(req.user_id, ctx.deleted.unwrap_or_default())
    })
}
