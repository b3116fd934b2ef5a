use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use common::types::MutationResult;
use service::catalog::domain::{AuthorRef, ListFilter, ProductInput, ProductView, ReviewInput};
use service::errors::ErrorKind;

use crate::errors::JsonApiError;
use crate::metrics;
use crate::state::AppState;

/// Header carrying the caller's user id until an authentication layer exists.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Integers from the path or query string; anything unparsable becomes 0.
fn parse_id(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// An empty body is the default payload; anything else must be valid JSON.
fn decode_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, JsonApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        metrics::ERRORS_TOTAL.with_label_values(&[ErrorKind::Validation.as_str()]).inc();
        JsonApiError::bad_request(format!("cannot convert request body: {e}"))
    })
}

fn author_from(headers: &HeaderMap) -> AuthorRef {
    match headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok()).and_then(|v| v.trim().parse().ok()) {
        Some(id) => AuthorRef(id),
        None => {
            let author = AuthorRef::placeholder();
            warn!(author_id = author.0, "no {} header, using placeholder author", USER_ID_HEADER);
            author
        }
    }
}

fn list_filter_from(params: &HashMap<String, String>) -> ListFilter {
    let text = |key: &str| params.get(key).cloned().unwrap_or_default();
    let number = |key: &str| params.get(key).map(|v| parse_id(v)).unwrap_or(0);
    ListFilter {
        search: text("search"),
        category_id: number("category"),
        sort_column: text("sort"),
        sort_type: text("sort_type"),
        page: number("page"),
        size: number("size"),
    }
}

pub async fn create_product(State(state): State<AppState>, body: Bytes) -> Result<Json<MutationResult>, JsonApiError> {
    metrics::REQUESTS_TOTAL.with_label_values(&["create_product"]).inc();
    let input: ProductInput = decode_body(&body)?;
    Ok(Json(state.catalog.create_product(input).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    body: Bytes,
) -> Result<Json<MutationResult>, JsonApiError> {
    metrics::REQUESTS_TOTAL.with_label_values(&["update_product"]).inc();
    let input: ProductInput = decode_body(&body)?;
    Ok(Json(state.catalog.update_product(parse_id(&product_id), input).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductView>, JsonApiError> {
    metrics::REQUESTS_TOTAL.with_label_values(&["get_product"]).inc();
    Ok(Json(state.catalog.get_product(parse_id(&product_id)).await?))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ProductView>>, JsonApiError> {
    metrics::REQUESTS_TOTAL.with_label_values(&["get_product_list"]).inc();
    Ok(Json(state.catalog.get_product_list(list_filter_from(&params)).await?))
}

pub async fn submit_review(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MutationResult>, JsonApiError> {
    metrics::REQUESTS_TOTAL.with_label_values(&["submit_review"]).inc();
    let input: ReviewInput = decode_body(&body)?;
    let res = state.catalog.submit_review(parse_id(&product_id), author_from(&headers), input).await?;
    metrics::REVIEWS_SUBMITTED_TOTAL.inc();
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn ids_fall_back_to_zero() {
        assert_eq!(parse_id("42"), 42);
        assert_eq!(parse_id("abc"), 0);
        assert_eq!(parse_id(""), 0);
    }

    #[test]
    fn empty_body_is_default_payload() {
        let input: ReviewInput = decode_body(&Bytes::new()).unwrap();
        assert_eq!(input, ReviewInput::default());
        let err = decode_body::<ReviewInput>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(err.message.starts_with("cannot convert request body"));
    }

    #[test]
    fn malformed_body_counts_as_validation_error() {
        let counter = metrics::ERRORS_TOTAL.with_label_values(&["validation"]);
        let before = counter.get();
        assert!(decode_body::<ProductInput>(&Bytes::from_static(b"[1, 2")).is_err());
        assert!(counter.get() > before);
    }

    #[test]
    fn author_header_wins_over_placeholder() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("901"));
        assert_eq!(author_from(&headers), AuthorRef(901));
        let fallback = author_from(&HeaderMap::new());
        assert!((0..777_777).contains(&fallback.0));
    }

    #[test]
    fn list_params_map_onto_filter() {
        let params: HashMap<String, String> = [
            ("search", "indo"), ("category", "2"), ("sort", "rating"),
            ("sort_type", "desc"), ("page", "x"), ("size", "5"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let f = list_filter_from(&params);
        assert_eq!(f.search, "indo");
        assert_eq!(f.category_id, 2);
        assert_eq!(f.sort_column, "rating");
        assert_eq!(f.sort_type, "desc");
        assert_eq!(f.page, 0);
        assert_eq!(f.size, 5);
    }
}
