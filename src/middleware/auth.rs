use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::AppError,
    utils::{TOKEN_COOKIE, verify_token},
};

/// 校验 `token` cookie，并把解析出的 Claims 放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| {
            tracing::warn!("Request without session token");
            AppError::Unauthorized
        })?;

    let claims = verify_token(&token, &state.config).map_err(|e| {
        tracing::warn!("Rejected session token: {}", e);
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
