use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content class an article belongs to. Drives which payout rate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    News,
    Blog,
}

impl ArticleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::News => "news",
            ArticleType::Blog => "blog",
        }
    }
}

impl std::fmt::Display for ArticleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance descriptor carried on every article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub author: String,
    /// ISO-8601 on the wire. Kept as the wire string: an unparseable value
    /// only disqualifies the article from date filtering, not from the
    /// collection.
    pub published_at: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub source: SourceRef,
    #[serde(rename = "type")]
    pub kind: ArticleType,
}

impl Article {
    /// Parses `published_at` into an instant, if it is well-formed.
    pub fn published_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

/// Per-type payout rates. Singleton configuration, persisted in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRate {
    pub news_rate: f64,
    pub blog_rate: f64,
}

impl PayoutRate {
    pub fn rate_for(&self, kind: ArticleType) -> f64 {
        match kind {
            ArticleType::News => self.news_rate,
            ArticleType::Blog => self.blog_rate,
        }
    }
}

impl Default for PayoutRate {
    fn default() -> Self {
        Self {
            news_rate: 50.0,
            blog_rate: 100.0,
        }
    }
}

/// One article's contribution to an author's payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutLine {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ArticleType,
    pub published_at: String,
    pub rate: f64,
}

/// Aggregate payout for one distinct author string.
///
/// Invariants: `total_payout == articles.iter().map(|l| l.rate).sum()` and
/// `article_count == articles.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayout {
    pub author: String,
    pub article_count: usize,
    pub total_payout: f64,
    pub articles: Vec<PayoutLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    News,
    Blog,
}

/// Transient per-session filter criteria. The default is the all-pass filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub author: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(rename = "type")]
    pub kind: TypeFilter,
    #[serde(default)]
    pub search_query: String,
}

/// Role claim supplied by the external identity provider. Consumed, never
/// produced, by this system; gating happens in the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(crate::Error::Shape(format!("unknown role: {}", other))),
        }
    }
}
