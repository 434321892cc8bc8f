//! HTTP Basic authentication.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::AuthConfig;
use crate::error::ApiError;

const CHALLENGE: &str = "Basic realm=\"Authorization Required\"";

/// Rejects requests whose `Authorization` header does not carry the
/// configured credentials.
pub(crate) async fn require_basic_auth(
    State(expected): State<Arc<AuthConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if authorization.is_some_and(|value| credentials_match(value, &expected)) {
        return next.run(request).await;
    }

    tracing::warn!("rejected request to {}: missing or wrong credentials", request.uri().path());
    let mut response = ApiError::unauthorized("authentication required").into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}

fn credentials_match(header: &str, expected: &AuthConfig) -> bool {
    let Some(encoded) = header.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    match decoded.split_once(':') {
        Some((user, password)) => user == expected.user && password == expected.password,
        None => false,
    }
}
