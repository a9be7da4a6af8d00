//! Deterministic mock review source.
//!
//! Serves a fixed pool of sample reviews templated on the query so the API
//! stays usable without a ScraperAPI credential. Same query and limit always
//! produce the same output, which also makes pipeline tests reproducible.

use anyhow::Result;
use async_trait::async_trait;

use crate::scrape::{RawReview, ReviewSource};

/// Size of the fixed sample pool.
pub const SAMPLE_POOL_SIZE: usize = 5;

pub struct MockScraper;

#[async_trait]
impl ReviewSource for MockScraper {
    async fn fetch(&self, query: &str, max_products: usize) -> Result<Vec<RawReview>> {
        let mut reviews = sample_reviews(query);
        reviews.truncate(max_products);
        Ok(reviews)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// The full sample pool for a query: one single-review "product" per entry,
/// ratings included (the only source that supplies them).
pub fn sample_reviews(query: &str) -> Vec<RawReview> {
    let display_name = title_case(query);
    vec![
        RawReview {
            product: format!("Sample {} Product 1", display_name),
            review: format!(
                "This is a great {} with excellent quality and performance. \
                 I highly recommend it to anyone looking for a reliable product.",
                query
            ),
            title: "Excellent Product!".to_string(),
            rating: Some(5),
        },
        RawReview {
            product: format!("Sample {} Product 2", display_name),
            review: format!(
                "The {} is okay but could be better. It works as expected \
                 but has some minor issues that could be improved.",
                query
            ),
            title: "Decent Product".to_string(),
            rating: Some(3),
        },
        RawReview {
            product: format!("Sample {} Product 3", display_name),
            review: format!(
                "I'm not satisfied with this {}. The quality is poor and it \
                 doesn't meet my expectations. Would not recommend.",
                query
            ),
            title: "Disappointed".to_string(),
            rating: Some(2),
        },
        RawReview {
            product: format!("Sample {} Product 4", display_name),
            review: format!(
                "Amazing {}! The features are outstanding and the build \
                 quality is excellent. Worth every penny.",
                query
            ),
            title: "Outstanding Quality".to_string(),
            rating: Some(5),
        },
        RawReview {
            product: format!("Sample {} Product 5", display_name),
            review: format!(
                "This {} is average. Nothing special but it gets the job \
                 done. Good value for money.",
                query
            ),
            title: "Average Product".to_string(),
            rating: Some(3),
        },
    ]
}

/// Uppercase the first letter of each word, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_is_deterministic() {
        let first = MockScraper.fetch("iphone", 5).await.unwrap();
        let second = MockScraper.fetch("iphone", 5).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fetch_is_bounded_by_pool_size() {
        assert_eq!(MockScraper.fetch("tv", 0).await.unwrap().len(), 0);
        assert_eq!(MockScraper.fetch("tv", 3).await.unwrap().len(), 3);
        assert_eq!(
            MockScraper.fetch("tv", 100).await.unwrap().len(),
            SAMPLE_POOL_SIZE
        );
    }

    #[tokio::test]
    async fn product_names_are_title_cased() {
        let reviews = MockScraper.fetch("wireless mouse", 1).await.unwrap();
        assert_eq!(reviews[0].product, "Sample Wireless Mouse Product 1");
    }

    #[test]
    fn pool_carries_ratings() {
        let ratings: Vec<Option<i64>> = sample_reviews("fan")
            .into_iter()
            .map(|r| r.rating)
            .collect();
        assert_eq!(
            ratings,
            vec![Some(5), Some(3), Some(2), Some(5), Some(3)]
        );
    }
}
