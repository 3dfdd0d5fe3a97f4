//! Filter engine: AND-composition of independent predicates over a
//! validated article collection.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Article, FilterState, TypeFilter};

/// Applies `filter` to `articles`, preserving relative order.
///
/// Each predicate is independent: a malformed `published_at` only excludes
/// the article from an active date bound, never globally. An unset or
/// unparseable bound is an all-pass.
pub fn apply(articles: &[Article], filter: &FilterState) -> Vec<Article> {
    articles
        .iter()
        .filter(|a| matches(a, filter))
        .cloned()
        .collect()
}

fn matches(article: &Article, filter: &FilterState) -> bool {
    author_matches(article, filter.author.as_deref())
        && date_matches(article, filter.date_from.as_deref(), filter.date_to.as_deref())
        && type_matches(article, filter.kind)
        && search_matches(article, &filter.search_query)
}

fn author_matches(article: &Article, wanted: Option<&str>) -> bool {
    match wanted {
        Some(needle) if !needle.trim().is_empty() => article
            .author
            .to_lowercase()
            .contains(&needle.trim().to_lowercase()),
        _ => true,
    }
}

fn date_matches(article: &Article, from: Option<&str>, to: Option<&str>) -> bool {
    let lower = from.and_then(parse_bound);
    let upper = to.and_then(parse_bound);
    if lower.is_none() && upper.is_none() {
        return true;
    }
    // A bound is active, so the article needs a parseable date to qualify.
    let Some(published) = article.published_instant() else {
        return false;
    };
    lower.map_or(true, |b| published >= b) && upper.map_or(true, |b| published <= b)
}

/// Accepts full ISO-8601 instants and plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn type_matches(article: &Article, wanted: TypeFilter) -> bool {
    match wanted {
        TypeFilter::All => true,
        TypeFilter::News => article.kind == crate::models::ArticleType::News,
        TypeFilter::Blog => article.kind == crate::models::ArticleType::Blog,
    }
}

fn search_matches(article: &Article, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    article.title.to_lowercase().contains(&needle)
        || article.description.to_lowercase().contains(&needle)
        || article.author.to_lowercase().contains(&needle)
}
