//! Middleware turning `Authorization: Bearer <jwt>` into identity headers.
//!
//! Used when the service is exposed without a gateway. Client-supplied identity
//! headers are always stripped so only a validated token can set them.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;
use http::{HeaderValue, StatusCode};

use crate::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::token::validate_access_token;

/// Shared secret used to validate bearer tokens.
#[derive(Clone)]
pub struct BearerAuth {
    secret: Arc<str>,
}

impl BearerAuth {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

/// Apply with `axum::middleware::from_fn_with_state(bearer_auth, inject_bearer_identity)`.
///
/// Requests without a bearer token pass through anonymously; an invalid token is 401.
pub async fn inject_bearer_identity(
    State(auth): State<BearerAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);

    let headers = request.headers_mut();
    headers.remove(USER_ID_HEADER);
    headers.remove(USER_ROLE_HEADER);

    if let Some(token) = token {
        let info = validate_access_token(&token, &auth.secret).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            StatusCode::UNAUTHORIZED
        })?;
        let user_id = HeaderValue::try_from(info.user_id.to_string())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        headers.insert(USER_ID_HEADER, user_id);
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static(info.role.as_str()));
    }

    Ok(next.run(request).await)
}
