use anyhow::Context as _;
use reqwest::Client;
use serde::Serialize;

use crate::domain::types::Email;

/// Sends transactional email through an HTTP JSON API.
///
/// Without an API URL, messages are only logged.
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_url: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl Mailer {
    pub fn new(client: Client, api_url: Option<String>, from: impl Into<String>) -> Self {
        Self {
            client,
            api_url,
            from: from.into(),
        }
    }

    pub async fn send(&self, email: &Email) -> anyhow::Result<()> {
        let Some(url) = self.api_url.as_deref() else {
            tracing::info!(to = %email.to, subject = %email.subject, "mail api not configured, email logged only");
            return Ok(());
        };
        self.client
            .post(url)
            .json(&OutboundMessage {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                text: &email.body,
            })
            .send()
            .await
            .context("send email request")?
            .error_for_status()
            .context("mail api rejected email")?;
        tracing::debug!(to = %email.to, "email sent");
        Ok(())
    }
}
