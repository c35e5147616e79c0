use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, Response, StatusCode},
    middleware::Next,
};
use chrono::Utc;
use tokio::time::Instant;
use tracing::{Level, error};

use crate::{
    build_info::{AXUM_VERSION, BUILD_TIME, RUST_VERSION},
    errors::code_error::{
        ERROR_CODE_HEADER, ERROR_DETAIL_HEADER, ERROR_LOG_LEVEL_HEADER, ERROR_MESSAGE_HEADER,
        ERROR_STATUS_CODE_HEADER,
    },
    init::state::ServerState,
};

// by default, debug and below not logged at all; hence why
macro_rules! log_codeerror {
    ($level:expr, method = $method:expr, path = $path:expr, client_ip = $client_ip:expr, status_code = $status_code:expr, duration = $duration:expr, error_code = $error_code:expr, message = $message:expr, detail = $detail:expr) => {
        match $level {
            Level::ERROR => tracing::error!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = ?$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::WARN => tracing::warn!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = ?$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::INFO => tracing::info!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = ?$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::DEBUG => tracing::debug!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = ?$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            _ => tracing::trace!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = ?$duration, error_code = %$error_code, message = %$message, detail = %$detail),
        }
    };
}

pub async fn log_middleware(
    State(state): State<Arc<ServerState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let now = Utc::now(); // earliest possible timestamp of server-received request

    state.add_responses_handled();

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let client_ip = client_ip(
        request.headers(),
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
    );

    tracing::info!(kind = %"RECV", method = %method, path = %path, client_ip = ?client_ip);
    request.extensions_mut().insert(now);

    let mut response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();
    let headers = response.headers_mut();

    match error_log_level(status, headers) {
        None => {
            tracing::info!(kind = %"RESP", method = %method, path = %path, client_ip = ?client_ip, status_code = %status.as_u16(), duration = ?duration);
        }
        Some(log_level) => {
            let error_code = header_value_to_str(headers.get(ERROR_CODE_HEADER)).unwrap_or("");
            let message = header_value_to_str(headers.get(ERROR_MESSAGE_HEADER))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or(""));
            let detail = header_value_to_str(headers.get(ERROR_DETAIL_HEADER)).unwrap_or("");

            log_codeerror!(
                log_level,
                method = method,
                path = path,
                client_ip = client_ip,
                status_code = status.as_u16(),
                duration = duration,
                error_code = error_code,
                message = message,
                detail = detail
            );
        }
    }

    strip_error_headers(headers);

    headers.insert("x-server-built-time", HeaderValue::from_static(BUILD_TIME));
    headers.insert("x-server-name", HeaderValue::from_static(AXUM_VERSION));
    headers.insert("x-server-rust-version", HeaderValue::from_static(RUST_VERSION));

    response
}

/// `None` for a successful response. Otherwise the level a `CodeErrorResp`
/// asked for, or one derived from the status class for errors axum produced
/// itself (405, 415, ...).
fn error_log_level(status: StatusCode, headers: &HeaderMap) -> Option<Level> {
    if status.is_success() {
        return None;
    }

    let requested = header_value_to_str(headers.get(ERROR_LOG_LEVEL_HEADER))
        .and_then(|level| level.parse::<Level>().ok());

    Some(requested.unwrap_or(if status.is_server_error() {
        Level::ERROR
    } else {
        Level::WARN
    }))
}

fn strip_error_headers(headers: &mut HeaderMap) {
    headers.remove(ERROR_LOG_LEVEL_HEADER);
    headers.remove(ERROR_STATUS_CODE_HEADER);
    headers.remove(ERROR_CODE_HEADER);
    headers.remove(ERROR_MESSAGE_HEADER);
    headers.remove(ERROR_DETAIL_HEADER);
}

fn header_value_to_str(value: Option<&HeaderValue>) -> Option<&str> {
    value.and_then(|v| v.to_str().ok())
}

/// Prefers the first hop of `x-forwarded-for` over the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    match header_value_to_str(headers.get("x-forwarded-for")) {
        Some(forwarded) => {
            let first_hop = forwarded.split(',').next().unwrap_or("").trim();
            match first_hop.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(e) => {
                    error!(error = ?e, forwarded, "Could not parse IP address into IpAddr");
                    peer.map(|addr| addr.ip())
                }
            }
        }
        None => peer.map(|addr| addr.ip()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();

        assert_eq!(
            client_ip(&headers, Some(peer)),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn unparsable_forwarded_for_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        let peer: SocketAddr = "192.0.2.1:443".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)), Some(peer.ip()));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn error_headers_are_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(ERROR_CODE_HEADER, HeaderValue::from_static("3"));
        headers.insert(ERROR_DETAIL_HEADER, HeaderValue::from_static("taken"));

        strip_error_headers(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn success_is_decided_by_status_not_headers() {
        assert_eq!(error_log_level(StatusCode::OK, &HeaderMap::new()), None);
        assert_eq!(
            error_log_level(StatusCode::METHOD_NOT_ALLOWED, &HeaderMap::new()),
            Some(Level::WARN)
        );
        assert_eq!(
            error_log_level(StatusCode::BAD_GATEWAY, &HeaderMap::new()),
            Some(Level::ERROR)
        );
    }

    #[test]
    fn code_error_level_header_wins_for_failures() {
        let mut headers = HeaderMap::new();
        headers.insert(ERROR_LOG_LEVEL_HEADER, HeaderValue::from_static("INFO"));

        assert_eq!(
            error_log_level(StatusCode::CONFLICT, &headers),
            Some(Level::INFO)
        );
    }
}
