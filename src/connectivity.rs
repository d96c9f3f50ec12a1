// src/connectivity.rs

//! "Are we online?" check performed before any sync.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

/// Timeout of the reachability request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub trait ConnectivityProbe: Send + Sync {
    /// `true` when the network looks usable. Never errors: any failure is
    /// reported as offline.
    fn is_online(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Issues a HEAD request against a well-known URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(url, client)
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn check(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(resp) => {
                debug!(url = %self.url, status = %resp.status(), "connectivity probe answered");
                true
            }
            Err(e) => {
                debug!(url = %self.url, error = %e, "connectivity probe failed");
                false
            }
        }
    }
}

impl ConnectivityProbe for HttpProbe {
    fn is_online(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(self.check())
    }
}
