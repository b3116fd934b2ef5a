use std::time::Duration;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::metrics::encode_metrics;
use crate::state::AppState;

pub mod products;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> impl IntoResponse {
    encode_metrics()
}

/// Build the application router: catalog routes plus health and metrics.
pub fn build_router(state: AppState, cors: CorsLayer, request_timeout: Duration) -> Router {
    let catalog = Router::new()
        .route("/products", post(products::create_product).get(products::list_products))
        .route("/products/:product_id", get(products::get_product).put(products::update_product))
        .route("/products/:product_id/action/review", post(products::submit_review))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(catalog)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and timeouts
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
