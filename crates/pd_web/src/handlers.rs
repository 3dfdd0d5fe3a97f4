use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use pd_core::{Article, PayoutRate, Role};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewsEnvelope {
    status: &'static str,
    articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    status: &'static str,
    message: String,
    details: String,
}

fn error_response(code: StatusCode, message: &str, details: String) -> Response {
    (
        code,
        Json(ErrorEnvelope {
            status: "error",
            message: message.to_string(),
            details,
        }),
    )
        .into_response()
}

/// Mediated fetch endpoint: proxies the provider with the server-held key
/// and returns the `{status, articles}` envelope.
pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Response {
    let result = match query.kind.as_deref() {
        Some("headlines") => state.provider.fetch_news().await,
        Some("everything") => state.provider.fetch_blogs().await,
        _ => state.provider.fetch_mixed().await,
    };

    match result {
        Ok(articles) => Json(NewsEnvelope {
            status: "ok",
            articles,
        })
        .into_response(),
        Err(e) => {
            warn!("⚠️ provider fetch failed: {}", e);
            error_response(
                StatusCode::BAD_GATEWAY,
                "Failed to fetch articles from the provider",
                e.to_string(),
            )
        }
    }
}

pub async fn payouts(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.get_payouts().await {
        Ok(payouts) => Json(payouts).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load payouts",
            e.to_string(),
        ),
    }
}

pub async fn get_rates(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.get_rates().await {
        Ok(rates) => Json(rates.unwrap_or_default()).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load rates",
            e.to_string(),
        ),
    }
}

/// Upserts the rate singleton and reprices any persisted aggregates.
/// The role claim is consumed for visibility only; gating belongs to the
/// surrounding application.
pub async fn put_rates(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(rates): Json<PayoutRate>,
) -> Response {
    if let Some(claim) = headers.get("x-role").and_then(|v| v.to_str().ok()) {
        match claim.parse::<Role>() {
            Ok(role) => debug!("rate update requested with {:?} role claim", role),
            Err(_) => debug!("unrecognized role claim: {}", claim),
        }
    }

    if rates.news_rate < 0.0 || rates.blog_rate < 0.0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Rates must be non-negative",
            format!("newsRate={}, blogRate={}", rates.news_rate, rates.blog_rate),
        );
    }

    if let Err(e) = state.cache.save_rates(&rates).await {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to persist rates",
            e.to_string(),
        );
    }

    match state.cache.get_payouts().await {
        Ok(previous) if !previous.is_empty() => {
            let rescaled = pd_payout::rescale(&previous, &rates);
            if let Err(e) = state.cache.save_payouts(&rescaled).await {
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to persist repriced payouts",
                    e.to_string(),
                );
            }
        }
        Ok(_) => {}
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load payouts",
                e.to_string(),
            )
        }
    }

    Json(rates).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use axum::body::Body;
    use axum::http::Request;
    use httpmock::{Method::GET, MockServer};
    use pd_core::{ArticleCache, ArticleType, AuthorPayout, PayoutLine};
    use pd_sources::DirectFetch;
    use pd_storage::MemoryCache;
    use serde_json::json;
    use tower::ServiceExt;

    fn app_with(cache: Arc<MemoryCache>, provider_base: &str) -> axum::Router {
        let provider =
            DirectFetch::new(reqwest::Client::new(), provider_base, "test-key").unwrap();
        create_app(AppState {
            cache,
            provider,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn news_endpoint_wraps_provider_results_in_an_ok_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [{
                        "title": "Headline",
                        "author": "Alice",
                        "url": "https://e.com/1",
                        "publishedAt": "2024-05-01T12:00:00Z",
                        "source": {"id": null, "name": "Wire"}
                    }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200)
                    .json_body(json!({"status": "ok", "articles": []}));
            })
            .await;

        let app = app_with(
            Arc::new(MemoryCache::new()),
            &format!("{}/v2", server.base_url()),
        );
        let response = app
            .oneshot(Request::get("/api/news?type=all").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["articles"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn news_endpoint_maps_total_provider_failure_to_502_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(500);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(500);
            })
            .await;

        let app = app_with(
            Arc::new(MemoryCache::new()),
            &format!("{}/v2", server.base_url()),
        );
        let response = app
            .oneshot(Request::get("/api/news").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("provider"));
    }

    #[tokio::test]
    async fn rates_default_until_first_upsert() {
        let app = app_with(Arc::new(MemoryCache::new()), "http://localhost:9");
        let response = app
            .oneshot(Request::get("/api/rates").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["newsRate"], 50.0);
        assert_eq!(body["blogRate"], 100.0);
    }

    #[tokio::test]
    async fn negative_rates_are_rejected_at_the_boundary() {
        let app = app_with(Arc::new(MemoryCache::new()), "http://localhost:9");
        let response = app
            .oneshot(
                Request::put("/api/rates")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"newsRate": -1.0, "blogRate": 10.0}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rate_upsert_reprices_persisted_payouts() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .save_payouts(&[AuthorPayout {
                author: "Alice".to_string(),
                article_count: 2,
                total_payout: 150.0,
                articles: vec![
                    PayoutLine {
                        id: "1".to_string(),
                        title: "Story 1".to_string(),
                        kind: ArticleType::News,
                        published_at: "2024-05-01T12:00:00Z".to_string(),
                        rate: 50.0,
                    },
                    PayoutLine {
                        id: "2".to_string(),
                        title: "Story 2".to_string(),
                        kind: ArticleType::Blog,
                        published_at: "2024-05-02T12:00:00Z".to_string(),
                        rate: 100.0,
                    },
                ],
            }])
            .await
            .unwrap();

        let app = app_with(cache.clone(), "http://localhost:9");
        let response = app
            .oneshot(
                Request::put("/api/rates")
                    .header("content-type", "application/json")
                    .header("x-role", "admin")
                    .body(Body::from(
                        json!({"newsRate": 10.0, "blogRate": 20.0}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payouts = cache.get_payouts().await.unwrap();
        assert_eq!(payouts[0].total_payout, 30.0);
        assert_eq!(payouts[0].article_count, 2);
        assert_eq!(
            cache.get_rates().await.unwrap().unwrap().news_rate,
            10.0
        );
    }
}
