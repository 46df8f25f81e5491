//! Auth types shared across Phonemart services.
//!
//! Provides JWT validation, the bearer-token middleware, and the `IdentityHeaders`
//! extractor with its role and ownership checks.

pub mod bearer;
pub mod identity;
pub mod token;
