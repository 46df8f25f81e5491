//! JWT access-token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

use phonemart_domain::id::UserId;
use phonemart_domain::user::Role;

/// User identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: UserId,
    pub role: Role,
    pub access_token_exp: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload issued by the identity provider.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (UUID string) |
/// | `role` | custom | `buyer` / `seller` / `admin` |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub role: String,
    pub exp: u64,
}

/// Validation: HS256, `exp` checked with the default 60s leeway, `exp` + `sub` required.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a bearer access token, returning the identity it carries.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AuthError::Malformed)?;
    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        role,
        access_token_exp: claims.exp,
    })
}
