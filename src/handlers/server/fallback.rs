use axum::http::Uri;

use crate::errors::code_error::{CodeError, CodeErrorResp, code_err};

pub async fn fallback_handler(uri: Uri) -> CodeErrorResp {
    code_err(CodeError::ROUTE_NOT_FOUND, uri.path())
}
