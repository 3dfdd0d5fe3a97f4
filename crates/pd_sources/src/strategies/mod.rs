use async_trait::async_trait;
use pd_core::{Article, Result};

pub mod cache;
pub mod direct;
pub mod mediated;
pub mod synthetic;

pub use cache::CacheRead;
pub use direct::DirectFetch;
pub use mediated::MediatedFetch;
pub use synthetic::SyntheticData;

/// One named acquisition strategy. The chain treats `Err` and an empty `Ok`
/// the same way: demote to the next strategy.
#[async_trait]
pub trait SourceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Remote strategies race the chain deadline and are eligible for cache
    /// write-back.
    fn is_remote(&self) -> bool {
        false
    }

    async fn fetch(&self) -> Result<Vec<Article>>;
}
