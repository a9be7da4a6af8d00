//! Scrape-then-annotate pipeline.
//!
//! Validates the query, runs the provider once, and attaches a sentiment
//! label and polarity score to every raw review. "Provider returned nothing"
//! is reported as a distinct not-found condition so the API layer can answer
//! 404 instead of an empty success.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::scrape::ScrapeProvider;
use crate::sentiment::{self, Sentiment};

/// A raw review plus its derived sentiment fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichedReview {
    pub product: String,
    pub review: String,
    pub title: String,
    pub rating: Option<i64>,
    pub sentiment: Sentiment,
    pub polarity: f32,
}

/// Fetch and annotate reviews for a search query. Never returns an empty
/// success: a blank query is a validation error, a zero-review fetch is
/// not-found. Output order matches provider order.
pub async fn run_search(
    provider: &ScrapeProvider,
    query: &str,
    max_products: usize,
) -> Result<Vec<EnrichedReview>, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::Validation(
            "Missing 'product' query parameter".to_string(),
        ));
    }

    let raw_reviews = provider.fetch(query, max_products).await?;
    if raw_reviews.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No reviews found for '{}'. Try a different search term.",
            query
        )));
    }

    Ok(raw_reviews
        .into_iter()
        .map(|raw| {
            let scored = sentiment::analyze(&raw.review);
            EnrichedReview {
                product: raw.product,
                review: raw.review,
                title: raw.title,
                rating: raw.rating,
                sentiment: scored.label,
                polarity: scored.polarity,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    #[tokio::test]
    async fn blank_query_is_rejected_before_fetching() {
        for query in ["", "   ", "\t\n"] {
            let err = run_search(&ScrapeProvider::mock(), query, 5)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn zero_reviews_is_not_found() {
        // max_products = 0 makes the mock return an empty vec
        let err = run_search(&ScrapeProvider::mock(), "iphone", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn mock_search_enriches_full_pool() {
        let enriched = run_search(&ScrapeProvider::mock(), "iphone", 5)
            .await
            .unwrap();
        assert_eq!(enriched.len(), mock::SAMPLE_POOL_SIZE);
        for review in &enriched {
            assert_eq!(review.sentiment, Sentiment::from_polarity(review.polarity));
        }
    }

    #[tokio::test]
    async fn output_preserves_provider_order() {
        let raw = mock::sample_reviews("iphone");
        let enriched = run_search(&ScrapeProvider::mock(), "iphone", 5)
            .await
            .unwrap();
        for (raw, enriched) in raw.iter().zip(&enriched) {
            assert_eq!(raw.review, enriched.review);
            assert_eq!(raw.product, enriched.product);
        }
    }

    #[tokio::test]
    async fn query_is_trimmed() {
        let enriched = run_search(&ScrapeProvider::mock(), "  iphone  ", 1)
            .await
            .unwrap();
        assert_eq!(enriched[0].product, "Sample Iphone Product 1");
    }
}
