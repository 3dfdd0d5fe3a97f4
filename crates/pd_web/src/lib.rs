use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news", get(handlers::news))
        .route("/api/payouts", get(handlers::payouts))
        .route(
            "/api/rates",
            get(handlers::get_rates).put(handlers::put_rates),
        )
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use pd_core::{Article, Error, Result};
}
