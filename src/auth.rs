//! HTTP Basic Authentication for staff routes and the staff WebSocket

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::ws::WsQuery;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Staff username (None = auth disabled)
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    /// Load auth config from environment variables.
    /// STAFF_USERNAME and STAFF_PASSWORD must both be set to enable auth.
    pub fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let username = read("STAFF_USERNAME");
        let password = read("STAFF_PASSWORD");

        if username.is_some() && password.is_some() {
            tracing::info!("Staff authentication enabled");
            Self { username, password }
        } else {
            if username.is_some() || password.is_some() {
                tracing::warn!(
                    "STAFF_USERNAME and STAFF_PASSWORD must both be set to enable authentication"
                );
            }
            tracing::warn!("Staff authentication DISABLED - anyone can act as staff!");
            Self {
                username: None,
                password: None,
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Validate credentials
    pub fn validate(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => {
                constant_time_eq(u.as_bytes(), username.as_bytes())
                    & constant_time_eq(p.as_bytes(), password.as_bytes())
            }
            _ => true,
        }
    }

    /// Check a raw `Authorization` header value
    fn authorizes(&self, header_value: Option<&str>) -> bool {
        header_value
            .and_then(|v| v.strip_prefix("Basic "))
            .and_then(|encoded| STANDARD.decode(encoded.trim()).ok())
            .and_then(|decoded| String::from_utf8(decoded).ok())
            .and_then(|decoded| {
                decoded
                    .split_once(':')
                    .map(|(user, pass)| self.validate(user, pass))
            })
            .unwrap_or(false)
    }
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(realm: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", realm))],
        "Unauthorized",
    )
        .into_response()
}

fn header_str(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Middleware for HTTP Basic Authentication on staff routes
pub async fn staff_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth_config.is_enabled() || auth_config.authorizes(header_str(&request)) {
        return next.run(request).await;
    }
    unauthorized("Trivia Night Staff")
}

/// Decode the socket query exactly as the WebSocket handler will.
///
/// A query the handler cannot decode is rejected there, so it is not staff here.
fn requests_staff_role(request: &Request<Body>) -> bool {
    Query::<WsQuery>::try_from_uri(request.uri())
        .map(|Query(params)| params.role.as_deref() == Some("staff"))
        .unwrap_or(false)
}

/// Require HTTP Basic Auth for `/ws?role=staff`.
///
/// Player and spectator sockets pass through untouched.
pub async fn staff_ws_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let is_staff_ws = request.uri().path() == "/ws" && requests_staff_role(&request);
    if !is_staff_ws {
        return next.run(request).await;
    }

    if !auth_config.is_enabled() {
        tracing::warn!(
            "Staff WebSocket requested but staff authentication is DISABLED; set STAFF_USERNAME and STAFF_PASSWORD"
        );
        return next.run(request).await;
    }

    if auth_config.authorizes(header_str(&request)) {
        return next.run(request).await;
    }
    unauthorized("Trivia Night Staff (WebSocket)")
}
