use crate::domain::repository::SideEffectPort;
use crate::domain::types::{Email, Notification};
use crate::infra::mail::Mailer;
use crate::infra::media::MediaClient;
use crate::infra::notify::NotificationHub;

/// Routes post-commit effects to the hub, the mailer and the media host.
#[derive(Clone)]
pub struct EffectDispatcher {
    pub hub: NotificationHub,
    pub mailer: Mailer,
    pub media: MediaClient,
}

impl SideEffectPort for EffectDispatcher {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        self.hub.publish(notification.clone());
        Ok(())
    }

    async fn send_email(&self, email: &Email) -> anyhow::Result<()> {
        self.mailer.send(email).await
    }

    async fn delete_media(&self, uri: &str) -> anyhow::Result<()> {
        self.media.delete(uri).await
    }
}
