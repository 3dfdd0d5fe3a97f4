use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;

use pd_core::{Article, ArticleType, Result, SourceRef};

use crate::strategies::SourceStrategy;

const AUTHORS: &[&str] = &[
    "Priya Shah",
    "Marcus Webb",
    "Elena Costa",
    "Tomás Okafor",
    "Ana Reyes",
];

const TOPICS: &[&str] = &[
    "markets", "climate", "chips", "elections", "health", "energy",
];

/// Strategy 4: placeholder data so the dashboard always has something to
/// render, even fully offline with an empty cache. No I/O on this path; it
/// must never fail.
pub struct SyntheticData {
    count: usize,
}

impl SyntheticData {
    pub fn new() -> Self {
        Self { count: 12 }
    }

    pub fn with_count(count: usize) -> Self {
        Self { count }
    }

    /// Two news items for every blog item, authors and topics rotating,
    /// timestamps randomly spread over the trailing 30 days.
    pub fn generate(&self) -> Vec<Article> {
        let mut rng = rand::thread_rng();
        let now = Utc::now();

        (0..self.count)
            .map(|i| {
                let kind = if i % 3 == 2 {
                    ArticleType::Blog
                } else {
                    ArticleType::News
                };
                let author = AUTHORS[i % AUTHORS.len()];
                let topic = TOPICS[i % TOPICS.len()];
                let minutes_back = rng.gen_range(0..60 * 24 * 30);
                let published = now - Duration::minutes(minutes_back);

                Article {
                    id: format!("synthetic-{}", i + 1),
                    title: format!("Placeholder briefing #{}: {}", i + 1, topic),
                    description: format!(
                        "Backup coverage of {} shown while live sources are unreachable.",
                        topic
                    ),
                    content: format!(
                        "This {} item on {} was generated locally because no live or \
                         cached articles were available.",
                        kind, topic
                    ),
                    author: author.to_string(),
                    published_at: published.to_rfc3339(),
                    url: None,
                    url_to_image: None,
                    source: SourceRef {
                        id: None,
                        name: "Offline Backup".to_string(),
                    },
                    kind,
                }
            })
            .collect()
    }
}

impl Default for SyntheticData {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceStrategy for SyntheticData {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        Ok(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn always_yields_a_renderable_collection() {
        let articles = SyntheticData::new().generate();
        assert!(!articles.is_empty());

        let ids: HashSet<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), articles.len());
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn keeps_the_two_to_one_news_blog_mix() {
        let articles = SyntheticData::with_count(12).generate();
        let news = articles
            .iter()
            .filter(|a| a.kind == ArticleType::News)
            .count();
        let blogs = articles.len() - news;
        assert_eq!(news, 8);
        assert_eq!(blogs, 4);
    }

    #[test]
    fn timestamps_fall_inside_the_trailing_thirty_days() {
        let now = Utc::now();
        for article in SyntheticData::new().generate() {
            let published = article.published_instant().unwrap();
            assert!(published <= now);
            assert!(now - published <= Duration::days(30));
        }
    }
}
