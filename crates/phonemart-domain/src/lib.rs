//! Domain types shared across Phonemart crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod id;
pub mod listing;
pub mod order;
pub mod pagination;
pub mod user;
