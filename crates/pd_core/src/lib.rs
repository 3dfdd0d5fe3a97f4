pub mod cache;
pub mod error;
pub mod filter;
pub mod models;
pub mod validate;

pub use cache::ArticleCache;
pub use error::Error;
pub use models::{
    Article, ArticleType, AuthorPayout, FilterState, PayoutLine, PayoutRate, Role, SourceRef,
    TypeFilter,
};

pub type Result<T> = std::result::Result<T, Error>;
