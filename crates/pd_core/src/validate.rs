//! Parse/validate boundary for untrusted article data.
//!
//! Every external ingress (mediated endpoint, direct provider, cache read)
//! goes through this module, so the rest of the workspace only ever sees
//! `Article` values that hold the collection invariants: non-empty id,
//! non-empty author and source name, a `type` in domain.

use chrono::Utc;
use serde::Deserialize;

use crate::models::{Article, ArticleType, SourceRef};

pub const UNTITLED_TITLE: &str = "Untitled Article";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const FALLBACK_SOURCE_NAME: &str = "News API";

/// Article as it arrives off the wire: everything optional, nothing trusted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default, rename = "type")]
    pub kind: Option<ArticleType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Maps one raw entry into a validated `Article`, substituting safe defaults
/// for missing fields. Returns `None` when no stable id can be derived:
/// provider rows carry no id field, so the url doubles as one.
pub fn validate(raw: RawArticle, fallback_kind: ArticleType) -> Option<Article> {
    let url = non_empty(raw.url);
    let id = non_empty(raw.id).or_else(|| url.clone())?;

    let source = raw.source.unwrap_or_default();
    Some(Article {
        id,
        title: non_empty(raw.title).unwrap_or_else(|| UNTITLED_TITLE.to_string()),
        description: raw.description.unwrap_or_default(),
        content: raw.content.unwrap_or_default(),
        author: non_empty(raw.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        published_at: non_empty(raw.published_at).unwrap_or_else(|| Utc::now().to_rfc3339()),
        url,
        url_to_image: non_empty(raw.url_to_image),
        source: SourceRef {
            id: non_empty(source.id),
            name: non_empty(source.name).unwrap_or_else(|| FALLBACK_SOURCE_NAME.to_string()),
        },
        kind: raw.kind.unwrap_or(fallback_kind),
    })
}

/// Validates a whole raw collection, dropping malformed entries.
pub fn sanitize(raws: Vec<RawArticle>, fallback_kind: ArticleType) -> Vec<Article> {
    raws.into_iter()
        .filter_map(|raw| validate(raw, fallback_kind))
        .collect()
}

/// Re-checks the id invariant on already-typed articles (cache ingress).
pub fn sanitize_articles(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| !a.id.trim().is_empty())
        .collect()
}
