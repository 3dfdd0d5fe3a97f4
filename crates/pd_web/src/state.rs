use std::sync::Arc;

use pd_core::ArticleCache;
use pd_sources::DirectFetch;

pub struct AppState {
    pub cache: Arc<dyn ArticleCache>,
    /// Server-side provider client; the credential never reaches the client.
    pub provider: DirectFetch,
}
