use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

// 公开的用户路由
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
}

// 需要认证的用户路由
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(routes::user::list_users).delete(routes::user::delete_user),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state));

    // axum 不允许在根路径上 nest
    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };
    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
