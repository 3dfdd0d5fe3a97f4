use async_trait::async_trait;
use std::sync::Arc;

use pd_core::validate::sanitize_articles;
use pd_core::{Article, ArticleCache, Result};

use crate::strategies::SourceStrategy;

/// Strategy 3: the most recently persisted collection. Cache contents went
/// through validation before being written, but the id invariant is
/// re-checked at this ingress like any other.
pub struct CacheRead {
    cache: Arc<dyn ArticleCache>,
}

impl CacheRead {
    pub fn new(cache: Arc<dyn ArticleCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl SourceStrategy for CacheRead {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        Ok(sanitize_articles(self.cache.get_articles().await?))
    }
}
