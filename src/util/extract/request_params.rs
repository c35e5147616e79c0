use std::collections::HashMap;

use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Map, Value};

use crate::errors::code_error::{CodeError, CodeErrorResp, code_err};

/// Every parameter a request carries, as one JSON object.
///
/// Query string pairs are read first; the body (a JSON object, or
/// form-urlencoded pairs) is laid over them, so a key present in both resolves
/// to the body's value.
#[derive(Debug, Default, Clone)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the named parameter exactly as received.
    pub fn get_str(&self, name: &str) -> Result<String, CodeErrorResp> {
        match self.0.get(name) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(code_err(
                CodeError::PARAMETER_NOT_STRING,
                format!("'{name}' was {}", json_kind(other)),
            )),
            None => Err(code_err(
                CodeError::PARAMETER_MISSING,
                format!("'{name}' not provided"),
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<S> FromRequest<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = CodeErrorResp;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params: Map<String, Value> = match req.uri().query() {
            Some(_) => {
                let Query(query) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
                    .map_err(|e| code_err(CodeError::QUERY_MALFORMED, e))?;
                query
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect()
            }
            None => Map::new(),
        };

        match BodyKind::of(&req) {
            BodyKind::Form => {
                let Form(form) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| body_rejection(e.status(), e))?;
                params.extend(form.into_iter().map(|(k, v)| (k, Value::String(v))));
            }
            kind => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| body_rejection(e.status(), e))?;

                if !body.iter().all(u8::is_ascii_whitespace) {
                    let BodyKind::Json = kind else {
                        return Err(CodeError::BODY_MEDIA_TYPE_UNSUPPORTED.into());
                    };
                    let body_params: Map<String, Value> = serde_json::from_slice(&body)
                        .map_err(|e| code_err(CodeError::BODY_MALFORMED, e))?;
                    params.extend(body_params);
                }
            }
        }

        Ok(Self(params))
    }
}

enum BodyKind {
    Json,
    Form,
    Unsupported,
}

impl BodyKind {
    // No content-type is read as JSON.
    fn of(req: &Request) -> Self {
        let Some(content_type) = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        else {
            return BodyKind::Json;
        };

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            BodyKind::Json
        } else if essence == "application/x-www-form-urlencoded" {
            BodyKind::Form
        } else {
            BodyKind::Unsupported
        }
    }
}

fn body_rejection(status: StatusCode, e: impl ToString) -> CodeErrorResp {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        code_err(CodeError::PAYLOAD_TOO_LARGE, e)
    } else {
        code_err(CodeError::BODY_MALFORMED, e)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde_json::json;

    use super::*;

    async fn extract_as(
        content_type: &str,
        uri: &str,
        body: &'static str,
    ) -> Result<RequestParams, CodeErrorResp> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        RequestParams::from_request(req, &()).await
    }

    async fn extract(uri: &str, body: &'static str) -> Result<RequestParams, CodeErrorResp> {
        extract_as("application/json", uri, body).await
    }

    #[tokio::test]
    async fn form_body_is_decoded_and_overrides_query_string() {
        let params = extract_as(
            "application/x-www-form-urlencoded; charset=utf-8",
            "/api/user/check-email?email=query@example.com&lang=en",
            "email=user%40example.com",
        )
        .await
        .unwrap();

        assert_eq!(params.get_str("email").unwrap(), "user@example.com");
        assert_eq!(params.get_str("lang").unwrap(), "en");
    }

    #[tokio::test]
    async fn missing_content_type_reads_json() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"email":"user@example.com"}"#))
            .unwrap();
        let params = RequestParams::from_request(req, &()).await.unwrap();

        assert_eq!(params.get_str("email").unwrap(), "user@example.com");
    }

    #[tokio::test]
    async fn unsupported_media_type_is_rejected_only_with_a_body() {
        let err = extract_as("text/plain", "/", "email=user@example.com")
            .await
            .unwrap_err();
        assert_eq!(
            err.error_code,
            CodeError::BODY_MEDIA_TYPE_UNSUPPORTED.error_code
        );
        assert_eq!(err.http_status_code, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let params = extract_as("text/plain", "/?email=user@example.com", "")
            .await
            .unwrap();
        assert_eq!(params.get_str("email").unwrap(), "user@example.com");
    }

    #[tokio::test]
    async fn reads_query_string_when_body_is_empty() {
        let params = extract("/api/user/check-email?email=user%40example.com", "")
            .await
            .unwrap();
        assert_eq!(params.get_str("email").unwrap(), "user@example.com");
    }

    #[tokio::test]
    async fn body_overrides_query_string() {
        let params = extract(
            "/api/user/check-email?email=query@example.com&lang=en",
            r#"{"email":"body@example.com"}"#,
        )
        .await
        .unwrap();
        assert_eq!(params.get_str("email").unwrap(), "body@example.com");
        assert_eq!(params.get_str("lang").unwrap(), "en");
    }

    #[tokio::test]
    async fn value_is_not_trimmed_or_lowercased() {
        let params = extract("/", r#"{"email":"  Mixed@Example.COM "}"#)
            .await
            .unwrap();
        assert_eq!(params.get_str("email").unwrap(), "  Mixed@Example.COM ");
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let err = extract("/", "[1, 2, 3]").await.unwrap_err();
        assert_eq!(err.error_code, CodeError::BODY_MALFORMED.error_code);
        assert_eq!(err.http_status_code, StatusCode::BAD_REQUEST);

        let err = extract("/", "{not json").await.unwrap_err();
        assert_eq!(err.error_code, CodeError::BODY_MALFORMED.error_code);
    }

    #[test]
    fn missing_and_non_string_parameters_are_distinguished() {
        let params = RequestParams::from_map(
            json!({ "email": 42 }).as_object().cloned().unwrap_or_default(),
        );

        let err = params.get_str("email").unwrap_err();
        assert_eq!(err.error_code, CodeError::PARAMETER_NOT_STRING.error_code);
        assert_eq!(err.error_message, "'email' was a number");

        let err = params.get_str("name").unwrap_err();
        assert_eq!(err.error_code, CodeError::PARAMETER_MISSING.error_code);
    }
}
