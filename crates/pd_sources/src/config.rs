use std::time::Duration;

use pd_core::{Error, Result};
use url::Url;

/// Acquisition settings. Populated from CLI flags and environment by the
/// binaries; the defaults point at a local mediated endpoint.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the trusted intermediary (keeps the provider key off the
    /// client).
    pub mediated_base: String,
    /// Base URL of the upstream content provider.
    pub provider_base: String,
    /// Provider credential. Empty means direct fetches will be rejected
    /// upstream and the chain falls through.
    pub api_key: String,
    /// Cheap target for the connectivity probe.
    pub probe_target: String,
    /// Deadline raced against each remote strategy.
    pub deadline: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mediated_base: "http://localhost:3000".to_string(),
            provider_base: "https://newsapi.org/v2".to_string(),
            api_key: String::new(),
            probe_target: "https://newsapi.org".to_string(),
            deadline: Duration::from_secs(8),
        }
    }
}

/// Parses a base URL, ensuring a trailing slash so `Url::join` appends
/// instead of replacing the last path segment.
pub(crate) fn parse_base(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| Error::Config(format!("invalid base url {:?}: {}", raw, e)))
}
