use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::{
    dto::{
        requests::user::check_email_request::{CheckEmailRequest, EMAIL_PARAM},
        responses::{
            response_data::{Response, http_resp},
            user::check_email_response::CheckEmailResponse,
        },
    },
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    services::user_service::CheckEmail,
    util::{extract::request_params::RequestParams, time::now::tokio_now},
};

/// Reads `email` and hands it to the user service untouched. Service failures
/// are returned as-is.
pub async fn check_email_action<S: CheckEmail>(
    user_service: &S,
    params: &RequestParams,
) -> HandlerResponse<Response<CheckEmailResponse>> {
    let start = tokio_now();

    let email = params.get_str(EMAIL_PARAM)?;
    user_service.check_email(&email).await?;

    Ok(http_resp(CheckEmailResponse {}, start))
}

#[utoipa::path(
    post,
    path = "/api/user/check-email",
    tag = "user",
    request_body(
        content(
            (CheckEmailRequest = "application/json"),
            (CheckEmailRequest = "application/x-www-form-urlencoded")
        )
    ),
    params(
        ("email" = Option<String>, Query, description = "Email to check; also accepted on GET")
    ),
    responses(
        (status = 200, description = "Email is well-formed and not yet registered", body = CheckEmailResponse),
        (status = 400, description = "Missing parameter or invalid email", body = CodeErrorResp),
        (status = 409, description = "Email already in use", body = CodeErrorResp),
        (status = 413, description = "Request body over 1 MiB", body = CodeErrorResp),
        (status = 415, description = "Body is neither JSON nor form-urlencoded", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn check_email_handler(
    State(state): State<Arc<ServerState>>,
    params: RequestParams,
) -> HandlerResponse<impl IntoResponse> {
    check_email_action(state.get_user_service(), &params).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Map, Value, json};

    use super::*;
    use crate::errors::code_error::{CodeError, code_err};

    struct RecordingUserService {
        calls: Mutex<Vec<String>>,
        taken: &'static str,
    }

    impl RecordingUserService {
        fn new(taken: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                taken,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CheckEmail for RecordingUserService {
        async fn check_email(&self, email: &str) -> Result<(), CodeErrorResp> {
            self.calls.lock().unwrap().push(email.to_string());
            if email == self.taken {
                return Err(code_err(CodeError::EMAIL_MUST_BE_UNIQUE, email));
            }
            Ok(())
        }
    }

    fn params(value: Value) -> RequestParams {
        RequestParams::from_map(value.as_object().cloned().unwrap_or_else(Map::new))
    }

    #[tokio::test]
    async fn available_email_yields_success_envelope() {
        let service = RecordingUserService::new("taken@example.com");

        let resp = check_email_action(&service, &params(json!({ "email": "user@example.com" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), 1);
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "status": 1, "payload": {} })
        );
    }

    #[tokio::test]
    async fn service_receives_the_exact_value_once() {
        let service = RecordingUserService::new("taken@example.com");
        let raw = " User@Example.com ";

        let _ = check_email_action(&service, &params(json!({ "email": raw }))).await;

        assert_eq!(service.calls(), vec![raw.to_string()]);
    }

    #[tokio::test]
    async fn service_failure_propagates_unchanged() {
        let service = RecordingUserService::new("taken@example.com");

        let err = check_email_action(&service, &params(json!({ "email": "taken@example.com" })))
            .await
            .unwrap_err();

        assert_eq!(err.error_code, CodeError::EMAIL_MUST_BE_UNIQUE.error_code);
        assert_eq!(err.message, CodeError::EMAIL_MUST_BE_UNIQUE.message);
        assert_eq!(err.error_message, "taken@example.com");
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_parameter_never_reaches_the_service() {
        let service = RecordingUserService::new("taken@example.com");

        let err = check_email_action(&service, &params(json!({ "mail": "user@example.com" })))
            .await
            .unwrap_err();

        assert_eq!(err.error_code, CodeError::PARAMETER_MISSING.error_code);
        assert!(service.calls().is_empty());
    }
}
