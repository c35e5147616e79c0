use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::responses::response_data::http_resp, errors::code_error::HandlerResponse,
    init::state::ServerState,
    util::time::{duration_formatter::format_duration, now::tokio_now},
};

#[derive(Serialize, ToSchema)]
pub struct RootHandlerResponse {
    app_name_version: String,
    deployment_environment: &'static str,
    server_uptime: String,
    responses_handled: u64,
}

#[utoipa::path(
    get,
    path = "/api/healthcheck/state",
    tag = "server",
    responses(
        (status = 200, description = "Server state", body = RootHandlerResponse)
    )
)]
pub async fn root_handler(
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Ok(http_resp(
        RootHandlerResponse {
            app_name_version: state.get_app_name_version(),
            deployment_environment: state.get_deployment_environment().as_str(),
            server_uptime: format_duration(state.get_uptime()),
            responses_handled: state.get_responses_handled(),
        },
        start,
    ))
}
