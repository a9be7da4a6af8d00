//! Storage contract shared by the Postgres and JSON-file backends.
//!
//! Both backends implement [`ReviewStore`] with equivalent semantics; they
//! differ in durability and in how ids are generated (database sequence vs
//! in-process counter). Callers depend only on the trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;

use crate::pipeline::EnrichedReview;

/// Bound applied to review listings when the caller omits `limit`.
pub const DEFAULT_REVIEW_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A persisted search episode. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProductRecord {
    pub id: i64,
    pub query: String,
    pub total_reviews: i64,
    pub created_at: String,
}

/// One persisted, sentiment-annotated review tied to a [`ProductRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReviewRecord {
    pub id: i64,
    pub product_id: i64,
    pub product: String,
    pub title: String,
    pub review: String,
    pub rating: Option<i64>,
    pub sentiment: String,
    pub polarity: f32,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub product_id: Option<i64>,
    pub sentiment: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoreStats {
    pub total_products: i64,
    pub total_reviews: i64,
    pub positive_reviews: i64,
    pub negative_reviews: i64,
    pub neutral_reviews: i64,
    pub average_polarity: f64,
}

/// Outcome of the best-effort persistence step. The read path succeeds either
/// way; this tells the caller whether the run was written and by which
/// backend, or why it was skipped.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoredOutcome {
    Stored {
        product_id: i64,
        reviews_inserted: usize,
        backend: String,
    },
    Skipped {
        note: String,
    },
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist a product search record and return its newly assigned id.
    /// Ids are unique and monotonically increasing per backend instance.
    async fn save_product(&self, query: &str, total_reviews: i64) -> Result<i64, StoreError>;

    /// Persist one record per enriched review, all referencing `product_id`.
    /// Returns the number saved.
    async fn save_reviews(
        &self,
        reviews: &[EnrichedReview],
        product_id: i64,
    ) -> Result<usize, StoreError>;

    /// All product records, most-recent-first.
    async fn list_products(&self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Review records matching the filter, most-recent-first, bounded by the
    /// filter limit (or [`DEFAULT_REVIEW_LIMIT`]).
    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>, StoreError>;

    async fn stats(&self) -> Result<StoreStats, StoreError>;

    fn backend_name(&self) -> &'static str;
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
