use axum::response::IntoResponse;
use serde_derive::Serialize;
use tracing::debug;

/// `status` value carried by every success envelope.
pub const STATUS_SUCCESS: i32 = 1;

#[derive(Serialize, Debug)]
pub struct Response<P: serde::Serialize> {
    status: i32,
    payload: P,
}

impl<P: serde::Serialize> Response<P> {
    pub fn status(&self) -> i32 {
        self.status
    }
}

impl<P: serde::Serialize> IntoResponse for Response<P> {
    fn into_response(self) -> axum::response::Response {
        axum::response::Json(self).into_response()
    }
}

pub fn http_resp<P: serde::Serialize>(payload: P, start: tokio::time::Instant) -> Response<P> {
    debug!(elapsed = ?start.elapsed(), "Response envelope built");
    Response {
        status: STATUS_SUCCESS,
        payload,
    }
}
