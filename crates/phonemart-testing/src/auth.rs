//! Mock identity helpers for integration tests.
//!
//! Services behind the gateway receive `x-phonemart-user-id` + `x-phonemart-user-role`
//! headers. `MockAuth` produces those headers directly so no gateway or JWT is needed.

use http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use phonemart_auth_types::identity::{IdentityHeaders, USER_ID_HEADER, USER_ROLE_HEADER};
use phonemart_domain::id::UserId;
use phonemart_domain::user::Role;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy)]
pub struct MockAuth {
    pub user_id: UserId,
    pub role: Role,
}

impl MockAuth {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn buyer() -> Self {
        Self::new(UserId(Uuid::new_v4()), Role::Buyer)
    }

    pub fn seller() -> Self {
        Self::new(UserId(Uuid::new_v4()), Role::Seller)
    }

    pub fn admin() -> Self {
        Self::new(UserId(Uuid::new_v4()), Role::Admin)
    }

    pub fn identity(&self) -> IdentityHeaders {
        IdentityHeaders {
            user_id: self.user_id,
            role: self.role,
        }
    }

    /// Header pairs as the gateway would inject them.
    pub fn header_pairs(&self) -> [(HeaderName, HeaderValue); 2] {
        [
            (
                HeaderName::from_static(USER_ID_HEADER),
                HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
            ),
            (
                HeaderName::from_static(USER_ROLE_HEADER),
                HeaderValue::from_static(self.role.as_str()),
            ),
        ]
    }

    pub fn headers(&self) -> HeaderMap {
        self.header_pairs().into_iter().collect()
    }
}
