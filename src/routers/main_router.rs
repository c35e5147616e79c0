use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn_with_state, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers::{
        server::{fallback::fallback_handler, healthcheck::healthcheck, root::root_handler},
        user::check_email::check_email_handler,
    },
    init::state::ServerState,
};

use super::middleware::logging::log_middleware;

const MAX_REQUEST_SIZE: usize = 1024 * 1024; // 1MB

pub fn build_router(state: Arc<ServerState>) -> axum::Router {
    let log_middleware = from_fn_with_state(state.clone(), log_middleware);
    let compression_middleware = CompressionLayer::new().gzip(true);
    let cors_layer = CorsLayer::very_permissive();

    let api_router = Router::new()
        .route("/api/healthcheck/server", get(healthcheck))
        .route("/api/healthcheck/state", get(root_handler))
        .route(
            "/api/user/check-email",
            get(check_email_handler).post(check_email_handler),
        )
        .fallback(fallback_handler)
        .layer(compression_middleware)
        .layer(log_middleware)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(cors_layer)
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
