use std::time::Duration;

use anyhow::Context as _;

pub mod db;
pub mod effects;
pub mod mail;
pub mod media;
pub mod notify;

/// HTTP client shared by the mail and media clients. Every request gives up after
/// `timeout`.
pub fn outbound_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .context("build outbound http client")
}
