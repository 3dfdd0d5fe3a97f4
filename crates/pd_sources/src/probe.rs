use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Reports whether network access is currently believed available.
/// Consulted before cache write-backs.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Probes a cheap HTTP target with a short timeout. Any response counts as
/// online; errors and timeouts count as offline.
pub struct HttpProbe {
    client: reqwest::Client,
    target: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            target: target.into(),
            timeout: Duration::from_secs(2),
        }
    }
}

#[async_trait]
impl Connectivity for HttpProbe {
    async fn is_online(&self) -> bool {
        match self
            .client
            .head(&self.target)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(_) => true,
            Err(e) => {
                debug!("connectivity probe failed: {}", e);
                false
            }
        }
    }
}

/// Fixed answer, for tests and the explicit offline mode.
pub struct StaticProbe(pub bool);

#[async_trait]
impl Connectivity for StaticProbe {
    async fn is_online(&self) -> bool {
        self.0
    }
}
