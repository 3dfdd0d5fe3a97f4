use async_trait::async_trait;
use futures::future::join;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use pd_core::validate::{sanitize, RawArticle};
use pd_core::{Article, ArticleType, Error, Result};

use crate::config::parse_base;
use crate::strategies::SourceStrategy;

/// Provider-defined response shape.
#[derive(Debug, Deserialize)]
struct ProviderResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Strategy 2: query the upstream provider directly with the configured
/// credential. Two topical queries run in parallel; provider rows carry no
/// `news|blog` discriminator, so the headline query maps to `news` and the
/// topical search to `blog`.
pub struct DirectFetch {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

impl DirectFetch {
    pub fn new(client: reqwest::Client, base: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base)?,
            api_key: api_key.into(),
        })
    }

    async fn query(
        &self,
        path: &str,
        params: &[(&str, &str)],
        kind: ArticleType,
    ) -> Result<Vec<Article>> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| Error::Config(format!("bad provider path {:?}: {}", path, e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("apiKey", &self.api_key);
        }

        let body: ProviderResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if body.status != "ok" {
            return Err(Error::Shape(format!(
                "provider returned status {:?}",
                body.status
            )));
        }
        Ok(sanitize(body.articles, kind))
    }

    pub async fn fetch_news(&self) -> Result<Vec<Article>> {
        self.query(
            "top-headlines",
            &[("category", "technology"), ("pageSize", "20")],
            ArticleType::News,
        )
        .await
    }

    pub async fn fetch_blogs(&self) -> Result<Vec<Article>> {
        self.query(
            "everything",
            &[("q", "technology blog"), ("pageSize", "10")],
            ArticleType::Blog,
        )
        .await
    }

    /// Both topical queries in parallel. Partial failures are tolerated;
    /// only both branches failing is an error. Concatenation order is
    /// fixed, headlines before topical, for reproducibility.
    pub async fn fetch_mixed(&self) -> Result<Vec<Article>> {
        let (news, blogs) = join(self.fetch_news(), self.fetch_blogs()).await;
        if let (Err(news_err), Err(blog_err)) = (&news, &blogs) {
            return Err(Error::Shape(format!(
                "both provider queries failed: {}; {}",
                news_err, blog_err
            )));
        }

        let mut articles = news.unwrap_or_else(|e| {
            warn!("📡 headline query failed: {}", e);
            Vec::new()
        });
        articles.extend(blogs.unwrap_or_else(|e| {
            warn!("📡 topical query failed: {}", e);
            Vec::new()
        }));
        Ok(articles)
    }
}

#[async_trait]
impl SourceStrategy for DirectFetch {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        self.fetch_mixed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn provider_article(title: &str, url: &str) -> serde_json::Value {
        json!({
            "source": {"id": null, "name": "TechWire"},
            "author": "Alice",
            "title": title,
            "description": "desc",
            "url": url,
            "publishedAt": "2024-05-01T12:00:00Z",
            "content": "body"
        })
    }

    #[tokio::test]
    async fn concatenates_headlines_before_topical() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/top-headlines")
                    .query_param("apiKey", "k");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [provider_article("headline", "https://e.com/1")]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/everything")
                    .query_param("apiKey", "k");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [provider_article("topical", "https://e.com/2")]
                }));
            })
            .await;

        let strategy = DirectFetch::new(
            reqwest::Client::new(),
            &format!("{}/v2", server.base_url()),
            "k",
        )
        .unwrap();
        let articles = strategy.fetch().await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "headline");
        assert_eq!(articles[0].kind, ArticleType::News);
        assert_eq!(articles[1].title, "topical");
        assert_eq!(articles[1].kind, ArticleType::Blog);
        // Provider rows have no id; the url stands in.
        assert_eq!(articles[0].id, "https://e.com/1");
    }

    #[tokio::test]
    async fn one_failed_branch_still_yields_the_other() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [provider_article("topical", "https://e.com/2")]
                }));
            })
            .await;

        let strategy = DirectFetch::new(
            reqwest::Client::new(),
            &format!("{}/v2", server.base_url()),
            "k",
        )
        .unwrap();
        let articles = strategy.fetch().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "topical");
    }

    #[tokio::test]
    async fn both_branches_failing_falls_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(500);
            })
            .await;

        let strategy = DirectFetch::new(
            reqwest::Client::new(),
            &format!("{}/v2", server.base_url()),
            "k",
        )
        .unwrap();
        assert!(strategy.fetch().await.is_err());
    }
}
