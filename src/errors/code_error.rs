use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_derive::Serialize;
use std::error::Error;
use std::fmt;
use tracing::Level;
use utoipa::ToSchema;

pub type HandlerResponse<T> = Result<T, CodeErrorResp>;

/// `status` value carried by every failure envelope.
pub const STATUS_FAILURE: i32 = -1;

pub const ERROR_LOG_LEVEL_HEADER: &str = "x-error-log-level";
pub const ERROR_STATUS_CODE_HEADER: &str = "x-error-status-code";
pub const ERROR_CODE_HEADER: &str = "x-error-code";
pub const ERROR_MESSAGE_HEADER: &str = "x-error-message";
pub const ERROR_DETAIL_HEADER: &str = "x-error-detail";

pub struct CodeError {
    pub error_code: u16,
    pub http_status_code: StatusCode,
    pub message: &'static str,
    pub log_level: Level,
}

impl CodeError {
    pub const POOL_ERROR: CodeError = CodeError {
        error_code: 0,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not get conn out of pool!",
        log_level: Level::ERROR,
    };
    pub const DB_QUERY_ERROR: CodeError = CodeError {
        error_code: 1,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Database query failed!",
        log_level: Level::ERROR,
    };
    pub const EMAIL_INVALID: CodeError = CodeError {
        error_code: 2,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Invalid email address!",
        log_level: Level::INFO,
    };
    pub const EMAIL_MUST_BE_UNIQUE: CodeError = CodeError {
        error_code: 3,
        http_status_code: StatusCode::CONFLICT,
        message: "Email already in use!",
        log_level: Level::INFO,
    };
    pub const PARAMETER_MISSING: CodeError = CodeError {
        error_code: 4,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Required parameter is missing!",
        log_level: Level::INFO,
    };
    pub const PARAMETER_NOT_STRING: CodeError = CodeError {
        error_code: 5,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Parameter must be a string!",
        log_level: Level::INFO,
    };
    pub const BODY_MALFORMED: CodeError = CodeError {
        error_code: 6,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Request body must be a JSON object!",
        log_level: Level::INFO,
    };
    pub const ROUTE_NOT_FOUND: CodeError = CodeError {
        error_code: 7,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Invalid path!",
        log_level: Level::WARN,
    };
    pub const QUERY_MALFORMED: CodeError = CodeError {
        error_code: 8,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Malformed query string!",
        log_level: Level::INFO,
    };
    pub const PAYLOAD_TOO_LARGE: CodeError = CodeError {
        error_code: 9,
        http_status_code: StatusCode::PAYLOAD_TOO_LARGE,
        message: "Request body is too large!",
        log_level: Level::WARN,
    };
    pub const BODY_MEDIA_TYPE_UNSUPPORTED: CodeError = CodeError {
        error_code: 10,
        http_status_code: StatusCode::UNSUPPORTED_MEDIA_TYPE,
        message: "Request body must be JSON or form-urlencoded!",
        log_level: Level::INFO,
    };
}

pub fn code_err(cerr: CodeError, e: impl ToString) -> CodeErrorResp {
    CodeErrorResp {
        status: STATUS_FAILURE,
        error_code: cerr.error_code,
        http_status_code: cerr.http_status_code,
        message: cerr.message.to_string(),
        error_message: e.to_string(),
        log_level: cerr.log_level,
    }
}

impl From<CodeError> for CodeErrorResp {
    fn from(cerr: CodeError) -> Self {
        CodeErrorResp {
            status: STATUS_FAILURE,
            error_code: cerr.error_code,
            http_status_code: cerr.http_status_code,
            message: cerr.message.to_string(),
            error_message: String::new(),
            log_level: cerr.log_level,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct CodeErrorResp {
    pub status: i32,
    pub error_code: u16,
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub http_status_code: StatusCode,
    pub message: String,
    pub error_message: String,
    #[serde(skip)]
    pub log_level: Level,
}

fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

impl fmt::Display for CodeErrorResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error_message)
    }
}

impl Error for CodeErrorResp {}

// The logging middleware reads the x-error-* headers and strips them again.
impl IntoResponse for CodeErrorResp {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.http_status_code, axum::Json(&self)).into_response();
        let headers = response.headers_mut();

        insert_header(headers, ERROR_LOG_LEVEL_HEADER, self.log_level.as_str());
        insert_header(
            headers,
            ERROR_STATUS_CODE_HEADER,
            self.http_status_code.as_str(),
        );
        insert_header(headers, ERROR_CODE_HEADER, &self.error_code.to_string());
        insert_header(headers, ERROR_MESSAGE_HEADER, &self.message);
        insert_header(headers, ERROR_DETAIL_HEADER, &self.error_message);

        response
    }
}

// Anything outside visible ASCII becomes '?', so the middleware can read it back
// with `to_str()`.
fn insert_header(headers: &mut HeaderMap, key: &'static str, value: &str) {
    let sanitized: String = value
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect();

    match HeaderValue::from_str(&sanitized) {
        Ok(value) => {
            headers.insert(key, value);
        }
        Err(_) => {
            headers.insert(key, HeaderValue::from_static("<non-ascii>"));
        }
    }
}
