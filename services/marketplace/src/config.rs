use std::time::Duration;

use serde::Deserialize;

use phonemart_core::config::Config;

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct MarketplaceConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `MARKETPLACE_PORT`.
    #[serde(default = "default_port")]
    pub marketplace_port: u16,
    /// When set, `Authorization: Bearer` tokens signed with it are accepted.
    pub jwt_secret: Option<String>,
    pub mail_api_url: Option<String>,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    pub media_api_url: Option<String>,
    /// Upper bound on each mail or media API call, in milliseconds.
    #[serde(default = "default_outbound_timeout_ms")]
    pub outbound_timeout_ms: u64,
    /// Per-connection backlog of undelivered notifications.
    #[serde(default = "default_notification_buffer")]
    pub notification_buffer: usize,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Config for MarketplaceConfig {}

impl MarketplaceConfig {
    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_millis(self.outbound_timeout_ms)
    }
}

fn default_port() -> u16 {
    3120
}

fn default_mail_from() -> String {
    "no-reply@phonemart.local".to_owned()
}

fn default_outbound_timeout_ms() -> u64 {
    5_000
}

fn default_notification_buffer() -> usize {
    256
}

fn default_run_migrations() -> bool {
    true
}
