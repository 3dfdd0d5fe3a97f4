//! The acquisition chain: an ordered list of named strategies folded by one
//! combinator. Policy (order, short-circuit condition, demotion) lives here;
//! transport mechanics live in the strategies.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use pd_core::{Article, ArticleCache, Error, Result};

use crate::config::SourceConfig;
use crate::guard::AcquisitionGuard;
use crate::probe::Connectivity;
use crate::strategies::{
    CacheRead, DirectFetch, MediatedFetch, SourceStrategy, SyntheticData,
};

pub struct SourceChain {
    strategies: Vec<Box<dyn SourceStrategy>>,
    cache: Arc<dyn ArticleCache>,
    probe: Arc<dyn Connectivity>,
    deadline: Duration,
}

struct Acquisition {
    articles: Vec<Article>,
    origin: &'static str,
    remote: bool,
}

impl SourceChain {
    /// The standard four-strategy chain: mediated, direct, cache, synthetic.
    pub fn with_defaults(
        config: &SourceConfig,
        cache: Arc<dyn ArticleCache>,
        probe: Arc<dyn Connectivity>,
    ) -> Result<Self> {
        let client = reqwest::Client::new();
        let strategies: Vec<Box<dyn SourceStrategy>> = vec![
            Box::new(MediatedFetch::new(client.clone(), &config.mediated_base)?),
            Box::new(DirectFetch::new(
                client,
                &config.provider_base,
                config.api_key.clone(),
            )?),
            Box::new(CacheRead::new(cache.clone())),
            Box::new(SyntheticData::new()),
        ];
        Ok(Self::new(strategies, cache, probe, config.deadline))
    }

    pub fn new(
        strategies: Vec<Box<dyn SourceStrategy>>,
        cache: Arc<dyn ArticleCache>,
        probe: Arc<dyn Connectivity>,
        deadline: Duration,
    ) -> Self {
        Self {
            strategies,
            cache,
            probe,
            deadline,
        }
    }

    /// Acquires an article collection. Never fails: the synthetic tail of
    /// the standard chain always yields renderable data.
    pub async fn acquire(&self) -> Vec<Article> {
        let acquisition = self.run().await;
        self.write_back(&acquisition);
        acquisition.articles
    }

    /// Guarded variant for re-entrant callers. Returns `None` when another
    /// acquisition is already in flight, or when this one's ticket went
    /// stale before completion. A stale completion writes nothing to the
    /// cache either.
    pub async fn acquire_guarded(&self, guard: &AcquisitionGuard) -> Option<Vec<Article>> {
        let ticket = guard.begin()?;
        let acquisition = self.run().await;
        if !guard.complete(&ticket) {
            debug!(
                "acquisition superseded, discarding {} articles from {}",
                acquisition.articles.len(),
                acquisition.origin
            );
            return None;
        }
        self.write_back(&acquisition);
        Some(acquisition.articles)
    }

    async fn run(&self) -> Acquisition {
        for strategy in &self.strategies {
            let outcome = if strategy.is_remote() {
                match timeout(self.deadline, strategy.fetch()).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(self.deadline)),
                }
            } else {
                strategy.fetch().await
            };

            match outcome {
                Ok(articles) if !articles.is_empty() => {
                    info!("🗞️ {} articles via {}", articles.len(), strategy.name());
                    return Acquisition {
                        articles,
                        origin: strategy.name(),
                        remote: strategy.is_remote(),
                    };
                }
                Ok(_) => debug!("{} yielded nothing, trying next source", strategy.name()),
                Err(e) => warn!("⚠️ {} failed: {}, trying next source", strategy.name(), e),
            }
        }

        // Unreachable with the standard chain; only a custom strategy list
        // can exhaust without a synthetic tail.
        Acquisition {
            articles: Vec::new(),
            origin: "exhausted",
            remote: false,
        }
    }

    /// Persists a network result, fire-and-forget: failures are logged and
    /// never fail the acquisition. The probe is consulted first.
    fn write_back(&self, acquisition: &Acquisition) {
        if !acquisition.remote || acquisition.articles.is_empty() {
            return;
        }
        let cache = self.cache.clone();
        let probe = self.probe.clone();
        let articles = acquisition.articles.clone();
        tokio::spawn(async move {
            if !probe.is_online().await {
                debug!("offline, skipping cache write-back");
                return;
            }
            if let Err(e) = cache.save_articles(&articles).await {
                warn!("⚠️ cache write-back failed: {}", e);
            }
        });
    }
}
