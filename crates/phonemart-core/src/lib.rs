//! Shared plumbing for Phonemart services: tracing, config loading, health probes,
//! request ids, serialization helpers and sea-orm extensions.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
