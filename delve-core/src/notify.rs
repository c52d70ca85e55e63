// Best-effort webhook notifications for matches and keyword hits

use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The frontier URL being fuzzed.
    pub target: String,
    /// The wordlist token that produced the hit.
    pub endpoint: String,
    pub size: u64,
    pub recursion_active: bool,
    pub keyword: Option<String>,
}

impl Notification {
    pub fn to_message(&self) -> String {
        let mut content = format!(
            "**Target:** {}\n**Endpoint:** {}\n**Size:** {}\n**Recursive:** {}",
            self.target,
            self.endpoint,
            self.size,
            if self.recursion_active {
                "active"
            } else {
                "inactive"
            }
        );
        if let Some(keyword) = &self.keyword {
            content.push_str(&format!("\n**Keyword:** {}", keyword));
        }
        content
    }
}

/// Fire-and-forget side channel. Implementations swallow their own failures.
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> impl Future<Output = ()> + Send;
}

/// `None` is the "no webhook configured" notifier.
impl<N: Notifier + Sync> Notifier for Option<N> {
    async fn notify(&self, notification: &Notification) {
        if let Some(inner) = self {
            inner.notify(notification).await;
        }
    }
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Rejected(u16),
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts `{"content": ...}` to a Discord-compatible webhook.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let message = notification.to_message();
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload { content: &message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected(status.as_u16()));
        }
        debug!("Webhook notified for {}", notification.endpoint);
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) {
        if let Err(e) = self.send(notification).await {
            warn!("Failed to send webhook notification: {}", e);
        }
    }
}
