// src/notify.rs

//! End-of-run push notifications.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::errors::{BackwatchError, Result};
use crate::paths::posix_str;

/// Pushbullet "create push" endpoint.
pub const PUSHBULLET_URL: &str = "https://api.pushbullet.com/v2/pushes";

/// Title of every notification.
pub const NOTIFICATION_TITLE: &str = "backwatch";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Failure,
}

/// One message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: MessageKind,
    /// Directories whose sync failed; empty on success.
    pub failed: Vec<PathBuf>,
}

impl Notification {
    pub fn success() -> Self {
        Self {
            kind: MessageKind::Success,
            failed: Vec::new(),
        }
    }

    pub fn failure(failed: Vec<PathBuf>) -> Self {
        Self {
            kind: MessageKind::Failure,
            failed,
        }
    }

    pub fn title(&self) -> &'static str {
        NOTIFICATION_TITLE
    }

    /// `Successful Sync`, or `Failed Sync` followed by one failed path per line.
    pub fn body(&self) -> String {
        match self.kind {
            MessageKind::Success => "Successful Sync".to_string(),
            MessageKind::Failure => {
                let mut body = String::from("Failed Sync");
                for path in &self.failed {
                    body.push('\n');
                    body.push_str(&posix_str(path));
                }
                body
            }
        }
    }
}

/// Delivers a [`Notification`] somewhere the user will see it.
pub trait Notifier: Send + Sync {
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

#[derive(Debug, Serialize)]
struct NotePush<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    title: &'a str,
    body: &'a str,
}

/// Sends a Pushbullet "note" push.
#[derive(Debug, Clone)]
pub struct PushbulletNotifier {
    token: String,
    url: String,
    client: reqwest::Client,
}

impl PushbulletNotifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_url(token, PUSHBULLET_URL)
    }

    /// Point at a different endpoint.
    pub fn with_url(token: impl Into<String>, url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(token, url, client)
    }

    pub fn with_client(
        token: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            token: token.into(),
            url: url.into(),
            client,
        }
    }

    async fn push(&self, notification: &Notification) -> Result<()> {
        let body = notification.body();
        let payload = NotePush {
            kind: "note",
            title: notification.title(),
            body: &body,
        };

        debug!(url = %self.url, kind = ?notification.kind, "sending notification");
        let response = self
            .client
            .post(&self.url)
            .header("Access-Token", &self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackwatchError::NotificationError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackwatchError::NotificationError(format!(
                "push rejected with {status}: {text}"
            )));
        }
        Ok(())
    }
}

impl Notifier for PushbulletNotifier {
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.push(notification))
    }
}
