use async_trait::async_trait;
use pd_core::{Article, ArticleCache, AuthorPayout, PayoutRate, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryStores {
    articles: Vec<Article>,
    payouts: Vec<AuthorPayout>,
    rates: Option<PayoutRate>,
}

/// In-memory cache. Always available; used by tests and as the backend when
/// no persistence path is configured.
#[derive(Default, Clone)]
pub struct MemoryCache {
    stores: Arc<RwLock<MemoryStores>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleCache for MemoryCache {
    async fn save_articles(&self, articles: &[Article]) -> Result<()> {
        let mut stores = self.stores.write().await;
        stores.articles = articles.to_vec();
        Ok(())
    }

    async fn get_articles(&self) -> Result<Vec<Article>> {
        Ok(self.stores.read().await.articles.clone())
    }

    async fn save_payouts(&self, payouts: &[AuthorPayout]) -> Result<()> {
        let mut stores = self.stores.write().await;
        stores.payouts = payouts.to_vec();
        Ok(())
    }

    async fn get_payouts(&self) -> Result<Vec<AuthorPayout>> {
        Ok(self.stores.read().await.payouts.clone())
    }

    async fn save_rates(&self, rates: &PayoutRate) -> Result<()> {
        let mut stores = self.stores.write().await;
        stores.rates = Some(*rates);
        Ok(())
    }

    async fn get_rates(&self) -> Result<Option<PayoutRate>> {
        Ok(self.stores.read().await.rates)
    }
}
