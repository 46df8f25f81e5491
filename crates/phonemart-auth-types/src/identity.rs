//! Gateway-injected identity headers extractor and role checks.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use http::StatusCode;
use http::request::Parts;

use phonemart_domain::id::UserId;
use phonemart_domain::user::{Capability, Role};

/// Header carrying the authenticated user id (UUID).
pub const USER_ID_HEADER: &str = "x-phonemart-user-id";

/// Header carrying the authenticated user role (`buyer` | `seller` | `admin`).
pub const USER_ROLE_HEADER: &str = "x-phonemart-user-role";

/// User identity injected by the gateway (or by [`crate::bearer`]) via headers.
///
/// Returns 401 if either header is absent or malformed. Role and ownership
/// enforcement (403) goes through [`IdentityHeaders::require`] and
/// [`IdentityHeaders::require_owner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: UserId,
    pub role: Role,
}

/// The identity lacks the role or ownership an action needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("forbidden")]
pub struct Forbidden;

impl IdentityHeaders {
    pub fn require(&self, capability: Capability) -> Result<(), Forbidden> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(Forbidden)
        }
    }

    /// Requires `capability` and that the caller is `owner`.
    pub fn require_owner(&self, capability: Capability, owner: UserId) -> Result<(), Forbidden> {
        self.require(capability)?;
        if self.user_id == owner {
            Ok(())
        } else {
            Err(Forbidden)
        }
    }

    /// Owner or moderator may see a listing regardless of its status.
    pub fn can_inspect(&self, owner: UserId) -> bool {
        self.user_id == owner || self.role.allows(Capability::Moderate)
    }
}

fn parse_identity(parts: &Parts) -> Option<IdentityHeaders> {
    let user_id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<UserId>().ok())?;
    let role = parts
        .headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<Role>().ok())?;
    Some(IdentityHeaders { user_id, role })
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are parsed synchronously so the returned future borrows nothing.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parse_identity(parts);
        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}

impl<S> OptionalFromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let identity = parse_identity(parts);
        async move { Ok(identity) }
    }
}
