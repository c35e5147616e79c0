//! OpenAPI documentation registration for Swagger UI.
//!
//! Important: Utoipa only exposes operations you list in `#[openapi(paths(...))]`.
//! Handler functions still need their own `#[utoipa::path(...)]` attributes.

use utoipa::OpenApi;

// ---- handlers (for `paths(...)`) ----
use crate::handlers::{
    server::{healthcheck, root},
    user::check_email,
};

// ---- schemas (for `components(schemas(...))`) ----
use crate::dto::{
    requests::user::check_email_request::CheckEmailRequest,
    responses::user::check_email_response::CheckEmailResponse,
};
use crate::errors::code_error::CodeErrorResp;
use crate::handlers::server::{
    healthcheck::ServerHealthcheckResponse, root::RootHandlerResponse,
};

/// Central OpenAPI document for Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        // --- server ---
        healthcheck::healthcheck,
        root::root_handler,

        // --- user ---
        check_email::check_email_handler,
    ),
    components(
        schemas(
            // shared error response
            CodeErrorResp,

            // --- server ---
            ServerHealthcheckResponse,
            RootHandlerResponse,

            // --- user DTOs ---
            CheckEmailRequest,
            CheckEmailResponse,
        )
    ),
    tags(
        (name = "server", description = "Server health and state"),
        (name = "user", description = "User account checks"),
    )
)]
pub struct ApiDoc;
