use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use pd_core::validate::{sanitize, RawArticle};
use pd_core::{Article, ArticleType, Error, Result};

use crate::config::parse_base;
use crate::strategies::SourceStrategy;

/// Envelope returned by the trusted intermediary endpoint.
#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    status: String,
    #[serde(default)]
    articles: Option<Vec<RawArticle>>,
}

/// Strategy 1: fetch a mixed set through the intermediary, which holds the
/// provider credential server-side.
pub struct MediatedFetch {
    client: reqwest::Client,
    endpoint: Url,
}

impl MediatedFetch {
    pub fn new(client: reqwest::Client, base: &str) -> Result<Self> {
        let endpoint = parse_base(base)?
            .join("api/news")
            .map_err(|e| Error::Config(format!("bad mediated endpoint: {}", e)))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SourceStrategy for MediatedFetch {
    fn name(&self) -> &'static str {
        "mediated"
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("type", "all");

        let envelope: NewsEnvelope = self.client.get(url).send().await?.json().await?;
        if envelope.status != "ok" {
            return Err(Error::Shape(format!(
                "mediated endpoint returned status {:?}",
                envelope.status
            )));
        }
        let raws = envelope
            .articles
            .ok_or_else(|| Error::Shape("mediated response missing articles".to_string()))?;
        Ok(sanitize(raws, ArticleType::News))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn parses_ok_envelope_and_drops_idless_entries() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news").query_param("type", "all");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [
                        {
                            "id": "m-1",
                            "title": "Mediated story",
                            "author": "Alice",
                            "publishedAt": "2024-05-01T12:00:00Z",
                            "source": {"id": null, "name": "Wire"},
                            "type": "blog"
                        },
                        {"title": "No id, no url"}
                    ]
                }));
            })
            .await;

        let strategy =
            MediatedFetch::new(reqwest::Client::new(), &server.base_url()).unwrap();
        let articles = strategy.fetch().await.unwrap();

        mock.assert_async().await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "m-1");
        assert_eq!(articles[0].kind, ArticleType::Blog);
    }

    #[tokio::test]
    async fn error_status_is_a_shape_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(502).json_body(json!({
                    "status": "error",
                    "message": "upstream unavailable",
                    "details": "timeout"
                }));
            })
            .await;

        let strategy =
            MediatedFetch::new(reqwest::Client::new(), &server.base_url()).unwrap();
        assert!(strategy.fetch().await.is_err());
    }

    #[tokio::test]
    async fn missing_articles_field_is_a_shape_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(200).json_body(json!({"status": "ok"}));
            })
            .await;

        let strategy =
            MediatedFetch::new(reqwest::Client::new(), &server.base_url()).unwrap();
        assert!(matches!(strategy.fetch().await, Err(Error::Shape(_))));
    }
}
