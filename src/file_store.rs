//! Flat-file storage backend: two JSON array files under a storage directory.
//!
//! Ids come from in-process atomic counters seeded from the files at startup,
//! so concurrent requests inside one process get unique ids. Known limits:
//! a second process writing the same directory can still interleave the
//! read-modify-write cycle (no file locking), and the counters only advance
//! from what was on disk when this instance opened.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::pipeline::EnrichedReview;
use crate::store::{
    round3, ProductRecord, ReviewFilter, ReviewRecord, ReviewStore, StoreError, StoreStats,
    DEFAULT_REVIEW_LIMIT,
};

pub struct FileStore {
    products_file: PathBuf,
    reviews_file: PathBuf,
    next_product_id: AtomicI64,
    next_review_id: AtomicI64,
}

impl FileStore {
    /// Open (or initialize) the storage directory and seed the id counters
    /// from the existing records.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let products_file = dir.join("products.json");
        let reviews_file = dir.join("reviews.json");
        if !products_file.exists() {
            fs::write(&products_file, "[]")?;
        }
        if !reviews_file.exists() {
            fs::write(&reviews_file, "[]")?;
        }

        let products: Vec<ProductRecord> = read_array(&products_file)?;
        let reviews: Vec<ReviewRecord> = read_array(&reviews_file)?;

        Ok(Self {
            products_file,
            reviews_file,
            next_product_id: AtomicI64::new(products.len() as i64 + 1),
            next_review_id: AtomicI64::new(reviews.len() as i64 + 1),
        })
    }
}

#[async_trait]
impl ReviewStore for FileStore {
    async fn save_product(&self, query: &str, total_reviews: i64) -> Result<i64, StoreError> {
        let mut products: Vec<ProductRecord> = read_array(&self.products_file)?;
        let id = self.next_product_id.fetch_add(1, Ordering::SeqCst);
        products.push(ProductRecord {
            id,
            query: query.to_string(),
            total_reviews,
            created_at: Utc::now().to_rfc3339(),
        });
        write_array(&self.products_file, &products)?;
        Ok(id)
    }

    async fn save_reviews(
        &self,
        reviews: &[EnrichedReview],
        product_id: i64,
    ) -> Result<usize, StoreError> {
        let mut stored: Vec<ReviewRecord> = read_array(&self.reviews_file)?;
        for review in reviews {
            let id = self.next_review_id.fetch_add(1, Ordering::SeqCst);
            stored.push(ReviewRecord {
                id,
                product_id,
                product: review.product.clone(),
                title: review.title.clone(),
                review: review.review.clone(),
                rating: review.rating,
                sentiment: review.sentiment.to_string(),
                polarity: review.polarity,
                created_at: Utc::now().to_rfc3339(),
            });
        }
        write_array(&self.reviews_file, &stored)?;
        Ok(reviews.len())
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let products: Vec<ProductRecord> = read_array(&self.products_file)?;
        // files append in creation order
        Ok(products.into_iter().rev().collect())
    }

    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>, StoreError> {
        let reviews: Vec<ReviewRecord> = read_array(&self.reviews_file)?;
        let limit = filter.limit.unwrap_or(DEFAULT_REVIEW_LIMIT).max(0) as usize;
        Ok(reviews
            .into_iter()
            .rev()
            .filter(|r| filter.product_id.map_or(true, |id| r.product_id == id))
            .filter(|r| {
                filter
                    .sentiment
                    .as_deref()
                    .map_or(true, |s| r.sentiment == s)
            })
            .take(limit)
            .collect())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let products: Vec<ProductRecord> = read_array(&self.products_file)?;
        let reviews: Vec<ReviewRecord> = read_array(&self.reviews_file)?;

        let count_label = |label: &str| {
            reviews.iter().filter(|r| r.sentiment == label).count() as i64
        };
        let average_polarity = if reviews.is_empty() {
            0.0
        } else {
            round3(
                reviews.iter().map(|r| r.polarity as f64).sum::<f64>() / reviews.len() as f64,
            )
        };

        Ok(StoreStats {
            total_products: products.len() as i64,
            total_reviews: reviews.len() as i64,
            positive_reviews: count_label("positive"),
            negative_reviews: count_label("negative"),
            neutral_reviews: count_label("neutral"),
            average_polarity,
        })
    }

    fn backend_name(&self) -> &'static str {
        "json-files"
    }
}

fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn write_array<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    Ok(fs::write(path, serde_json::to_string_pretty(items)?)?)
}
