use async_trait::async_trait;

use crate::models::{Article, AuthorPayout, PayoutRate};
use crate::Result;

/// Persistent key-indexed cache with three logical stores: articles (by id),
/// payout aggregates (by author) and the rate singleton. Implementations
/// must surface storage failures as `Err`, never drop data silently.
#[async_trait]
pub trait ArticleCache: Send + Sync {
    /// Atomically replaces the whole article store with `articles`.
    async fn save_articles(&self, articles: &[Article]) -> Result<()>;

    /// Returns the most recently persisted article collection, in the order
    /// it was saved.
    async fn get_articles(&self) -> Result<Vec<Article>>;

    /// Atomically replaces the whole payout store with `payouts`.
    async fn save_payouts(&self, payouts: &[AuthorPayout]) -> Result<()>;

    async fn get_payouts(&self) -> Result<Vec<AuthorPayout>>;

    /// Upserts the rate singleton.
    async fn save_rates(&self, rates: &PayoutRate) -> Result<()>;

    /// Returns the persisted rates, or `None` if none were ever saved.
    async fn get_rates(&self) -> Result<Option<PayoutRate>>;
}
