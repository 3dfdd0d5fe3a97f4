pub mod chain;
pub mod config;
pub mod guard;
pub mod probe;
pub mod strategies;

pub use chain::SourceChain;
pub use config::SourceConfig;
pub use guard::AcquisitionGuard;
pub use probe::{Connectivity, HttpProbe, StaticProbe};
pub use strategies::{CacheRead, DirectFetch, MediatedFetch, SourceStrategy, SyntheticData};

pub mod prelude {
    pub use super::chain::SourceChain;
    pub use super::strategies::SourceStrategy;
    pub use pd_core::{Article, Error, Result};
}
