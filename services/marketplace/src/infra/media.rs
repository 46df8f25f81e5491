use anyhow::Context as _;
use reqwest::Client;
use serde::Serialize;

/// Client for the media host that stores listing images and avatars.
#[derive(Clone)]
pub struct MediaClient {
    client: Client,
    api_url: Option<String>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    uri: &'a str,
}

impl MediaClient {
    pub fn new(client: Client, api_url: Option<String>) -> Self {
        Self { client, api_url }
    }

    /// Ask the media host to delete `uri`. A no-op when no media host is configured.
    pub async fn delete(&self, uri: &str) -> anyhow::Result<()> {
        let Some(url) = self.api_url.as_deref() else {
            tracing::debug!(uri, "media api not configured, skipping delete");
            return Ok(());
        };
        self.client
            .delete(url)
            .json(&DeleteRequest { uri })
            .send()
            .await
            .context("send media delete request")?
            .error_for_status()
            .context("media api rejected delete")?;
        Ok(())
    }
}
