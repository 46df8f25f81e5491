use crate::domain::repository::SideEffectPort;
use crate::domain::types::{Email, Notification};

/// A best-effort action to run once the primary write has committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notification),
    SendEmail(Email),
    DeleteMedia(String),
}

impl Effect {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Notify(_) => "notify",
            Self::SendEmail(_) => "send_email",
            Self::DeleteMedia(_) => "delete_media",
        }
    }
}

/// Ordered list of effects collected by a use case.
///
/// Run only after the storage write returned successfully. Every effect is attempted;
/// a failure is logged and never reaches the caller.
#[derive(Debug, Default)]
pub struct PostCommit {
    effects: Vec<Effect>,
}

impl PostCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notification: Notification) -> &mut Self {
        self.effects.push(Effect::Notify(notification));
        self
    }

    pub fn send_email(&mut self, email: Email) -> &mut Self {
        self.effects.push(Effect::SendEmail(email));
        self
    }

    pub fn delete_media(&mut self, uri: impl Into<String>) -> &mut Self {
        self.effects.push(Effect::DeleteMedia(uri.into()));
        self
    }

    /// Returns the number of effects that failed.
    pub async fn run<P: SideEffectPort>(self, port: &P) -> usize {
        let mut failed = 0;
        for effect in &self.effects {
            let result = match effect {
                Effect::Notify(notification) => port.notify(notification).await,
                Effect::SendEmail(email) => port.send_email(email).await,
                Effect::DeleteMedia(uri) => port.delete_media(uri).await,
            };
            match result {
                Ok(()) => tracing::debug!(effect = effect.kind(), "side effect delivered"),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(effect = effect.kind(), error = ?e, "side effect failed");
                }
            }
        }
        failed
    }
}
