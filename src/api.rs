//! HTTP handlers and request/response types.
//!
//! Every handler is stateless over [`AppState`]: the search endpoint drives
//! the scrape pipeline and persists best-effort, the rest read straight from
//! the storage backend.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::pipeline::{self, EnrichedReview};
use crate::scrape::ScrapeProvider;
use crate::store::{
    ProductRecord, ReviewFilter, ReviewRecord, ReviewStore, StoreStats, StoredOutcome,
    DEFAULT_REVIEW_LIMIT,
};

/// Products scraped per search; matches the mock sample pool so mock mode
/// serves the full pool.
const DEFAULT_MAX_PRODUCTS: usize = 5;

pub struct AppState {
    pub provider: ScrapeProvider,
    pub store: Arc<dyn ReviewStore>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Product search query
    pub product: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListParams {
    /// Filter by sentiment label (positive, negative, neutral)
    pub sentiment: Option<String>,
    /// Maximum records returned (default 50)
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub product: String,
    pub query_type: String,
    pub reviews: Vec<EnrichedReview>,
    pub total_reviews: usize,
    pub stored: StoredOutcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductsResponse {
    pub products: Vec<ProductRecord>,
    pub count: usize,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppliedFilters {
    pub product_id: i64,
    pub sentiment: Option<String>,
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewRecord>,
    pub count: usize,
    pub filters: AppliedFilters,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SentimentPercentages {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub database_stats: StoreStats,
    pub sentiment_percentages: SentimentPercentages,
    pub status: String,
}

/// Service banner with usage hints.
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Product Review Scraper API is running!",
        "usage": {
            "search_by_name": "/api/reviews?product=iphone",
            "get_products": "/api/products",
            "get_reviews": "/api/reviews/{product_id}",
            "get_stats": "/api/stats"
        }
    }))
}

/// Static health payload.
#[utoipa::path(
    get,
    path = "/api/test",
    responses((status = 200, description = "API is reachable")),
    tag = "reviews"
)]
pub async fn test_endpoint() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "API is working correctly",
        "endpoints": {
            "reviews": "/api/reviews?product=test",
            "products": "/api/products",
            "stats": "/api/stats",
            "test": "/api/test"
        }
    }))
}

/// Scrape reviews for a search query, annotate sentiment, persist best-effort.
#[utoipa::path(
    get,
    path = "/api/reviews",
    params(SearchParams),
    responses(
        (status = 200, description = "Annotated reviews for the query", body = SearchResponse),
        (status = 400, description = "Missing or blank 'product' parameter"),
        (status = 404, description = "No reviews found for the query"),
        (status = 500, description = "Unexpected failure")
    ),
    tag = "reviews"
)]
pub async fn search_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.product.unwrap_or_default();
    let reviews = pipeline::run_search(&state.provider, &query, DEFAULT_MAX_PRODUCTS).await?;
    let stored = persist_run(&state, query.trim(), &reviews).await;

    Ok(Json(SearchResponse {
        product: query.trim().to_string(),
        query_type: "search".to_string(),
        total_reviews: reviews.len(),
        reviews,
        stored,
    }))
}

/// Best-effort persistence: a storage failure is downgraded to a `Skipped`
/// outcome so the scrape results still reach the caller.
async fn persist_run(
    state: &AppState,
    query: &str,
    reviews: &[EnrichedReview],
) -> StoredOutcome {
    let product_id = match state.store.save_product(query, reviews.len() as i64).await {
        Ok(id) => id,
        Err(e) => {
            eprintln!("⚠️ Storage failed: {}", e);
            println!("   Continuing without storage...");
            return StoredOutcome::Skipped {
                note: format!("Storage not available - data not stored ({})", e),
            };
        }
    };

    match state.store.save_reviews(reviews, product_id).await {
        Ok(reviews_inserted) => StoredOutcome::Stored {
            product_id,
            reviews_inserted,
            backend: state.store.backend_name().to_string(),
        },
        Err(e) => {
            eprintln!("⚠️ Review insert failed: {}", e);
            StoredOutcome::Skipped {
                note: format!(
                    "Product {} saved but review insert failed ({})",
                    product_id, e
                ),
            }
        }
    }
}

/// All stored products, most recent first.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Stored product searches", body = ProductsResponse),
        (status = 500, description = "Storage failure")
    ),
    tag = "reviews"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = state.store.list_products().await?;
    Ok(Json(ProductsResponse {
        count: products.len(),
        products,
        status: "success".to_string(),
    }))
}

/// Stored reviews for one product, optionally filtered by sentiment.
#[utoipa::path(
    get,
    path = "/api/reviews/{product_id}",
    params(
        ("product_id" = i64, Path, description = "Product record id"),
        ReviewListParams
    ),
    responses(
        (status = 200, description = "Stored reviews for the product", body = ReviewsResponse),
        (status = 400, description = "Invalid product id"),
        (status = 500, description = "Storage failure")
    ),
    tag = "reviews"
)]
pub async fn list_reviews_for_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Query(params): Query<ReviewListParams>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_REVIEW_LIMIT);
    let reviews = state
        .store
        .list_reviews(ReviewFilter {
            product_id: Some(product_id),
            sentiment: params.sentiment.clone(),
            limit: Some(limit),
        })
        .await?;

    Ok(Json(ReviewsResponse {
        count: reviews.len(),
        reviews,
        filters: AppliedFilters {
            product_id,
            sentiment: params.sentiment,
            limit,
        },
        status: "success".to_string(),
    }))
}

/// Storage statistics with a sentiment percentage breakdown.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Database statistics", body = StatsResponse),
        (status = 500, description = "Storage failure")
    ),
    tag = "reviews"
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.stats().await?;
    // 0 reviews means all-zero percentages, never a division by zero
    let percentage = |count: i64| {
        if stats.total_reviews > 0 {
            round1(count as f64 / stats.total_reviews as f64 * 100.0)
        } else {
            0.0
        }
    };

    let sentiment_percentages = SentimentPercentages {
        positive: percentage(stats.positive_reviews),
        negative: percentage(stats.negative_reviews),
        neutral: percentage(stats.neutral_reviews),
    };

    Ok(Json(StatsResponse {
        database_stats: stats,
        sentiment_percentages,
        status: "success".to_string(),
    }))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_store::FileStore;
    use crate::sentiment::Sentiment;
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> Arc<AppState> {
        Arc::new(AppState {
            provider: ScrapeProvider::mock(),
            store: Arc::new(FileStore::new(dir.path()).unwrap()),
        })
    }

    #[tokio::test]
    async fn blank_product_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        for product in [None, Some("".to_string()), Some("   ".to_string())] {
            let err = search_reviews(State(state.clone()), Query(SearchParams { product }))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn mock_search_returns_full_pool_and_stores_it() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let Json(response) = search_reviews(
            State(state.clone()),
            Query(SearchParams {
                product: Some("iphone".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.product, "iphone");
        assert_eq!(response.total_reviews, 5);
        for review in &response.reviews {
            assert!(matches!(
                review.sentiment,
                Sentiment::Positive | Sentiment::Negative | Sentiment::Neutral
            ));
        }
        match response.stored {
            StoredOutcome::Stored {
                product_id,
                reviews_inserted,
                ..
            } => {
                assert_eq!(product_id, 1);
                assert_eq!(reviews_inserted, 5);
            }
            StoredOutcome::Skipped { note } => panic!("expected stored outcome, got: {}", note),
        }
    }

    #[tokio::test]
    async fn stats_after_search_cover_the_stored_run() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        search_reviews(
            State(state.clone()),
            Query(SearchParams {
                product: Some("iphone".to_string()),
            }),
        )
        .await
        .unwrap();

        let Json(stats) = get_stats(State(state.clone())).await.unwrap();
        assert_eq!(stats.database_stats.total_products, 1);
        assert!(stats.database_stats.total_reviews >= 5);
        let sum = stats.sentiment_percentages.positive
            + stats.sentiment_percentages.negative
            + stats.sentiment_percentages.neutral;
        assert!((sum - 100.0).abs() < 0.5);
    }

    #[tokio::test]
    async fn stats_on_empty_store_report_zero_percentages() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let Json(stats) = get_stats(State(state)).await.unwrap();
        assert_eq!(stats.database_stats.total_reviews, 0);
        assert_eq!(stats.sentiment_percentages.positive, 0.0);
        assert_eq!(stats.sentiment_percentages.negative, 0.0);
        assert_eq!(stats.sentiment_percentages.neutral, 0.0);
    }

    #[tokio::test]
    async fn stored_reviews_are_listed_by_product_id() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        search_reviews(
            State(state.clone()),
            Query(SearchParams {
                product: Some("iphone".to_string()),
            }),
        )
        .await
        .unwrap();

        let Json(listing) = list_reviews_for_product(
            State(state.clone()),
            Path(1),
            Query(ReviewListParams {
                sentiment: None,
                limit: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(listing.count, 5);
        assert_eq!(listing.filters.limit, DEFAULT_REVIEW_LIMIT);
        assert!(listing.reviews.iter().all(|r| r.product_id == 1));

        let Json(products) = list_products(State(state)).await.unwrap();
        assert_eq!(products.count, 1);
        assert_eq!(products.products[0].query, "iphone");
        assert_eq!(products.products[0].total_reviews, 5);
    }
}
