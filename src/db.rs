//! Postgres storage backend.
//!
//! Ids come from `BIGSERIAL` sequences, so they stay unique under concurrent
//! writers; this is the backend to run when more than one process serves
//! requests. Timestamps are rendered to ISO-8601 strings in the queries so
//! records look identical to the file backend's.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};

use crate::pipeline::EnrichedReview;
use crate::store::{
    round3, ProductRecord, ReviewFilter, ReviewRecord, ReviewStore, StoreError, StoreStats,
    DEFAULT_REVIEW_LIMIT,
};

const CREATED_AT_FORMAT: &str = r#"YYYY-MM-DD"T"HH24:MI:SS"#;

pub async fn init_db(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            query VARCHAR NOT NULL,
            total_reviews BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id BIGSERIAL PRIMARY KEY,
            product_id BIGINT NOT NULL REFERENCES products(id),
            product TEXT NOT NULL,
            title TEXT NOT NULL,
            review TEXT NOT NULL,
            rating BIGINT,
            sentiment VARCHAR NOT NULL,
            polarity REAL NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn save_product(&self, query: &str, total_reviews: i64) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "INSERT INTO products (query, total_reviews) VALUES ($1, $2) RETURNING id",
        )
        .bind(query)
        .bind(total_reviews)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("id"))
    }

    async fn save_reviews(
        &self,
        reviews: &[EnrichedReview],
        product_id: i64,
    ) -> Result<usize, StoreError> {
        for review in reviews {
            sqlx::query(
                r#"
                INSERT INTO reviews (product_id, product, title, review, rating, sentiment, polarity)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(product_id)
            .bind(&review.product)
            .bind(&review.title)
            .bind(&review.review)
            .bind(review.rating)
            .bind(review.sentiment.as_str())
            .bind(review.polarity)
            .execute(&self.pool)
            .await?;
        }
        Ok(reviews.len())
    }

    async fn list_products(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let products: Vec<ProductRecord> = sqlx::query_as(&format!(
            r#"SELECT id, query, total_reviews,
               to_char(created_at, '{fmt}') as created_at
               FROM products
               ORDER BY id DESC"#,
            fmt = CREATED_AT_FORMAT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>, StoreError> {
        let reviews: Vec<ReviewRecord> = sqlx::query_as(&format!(
            r#"SELECT id, product_id, product, title, review, rating, sentiment, polarity,
               to_char(created_at, '{fmt}') as created_at
               FROM reviews
               WHERE ($1::BIGINT IS NULL OR product_id = $1)
                 AND ($2::VARCHAR IS NULL OR sentiment = $2)
               ORDER BY id DESC
               LIMIT $3"#,
            fmt = CREATED_AT_FORMAT
        ))
        .bind(filter.product_id)
        .bind(filter.sentiment.as_deref())
        .bind(filter.limit.unwrap_or(DEFAULT_REVIEW_LIMIT).max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE sentiment = 'positive') AS positive,
                   COUNT(*) FILTER (WHERE sentiment = 'negative') AS negative,
                   COUNT(*) FILTER (WHERE sentiment = 'neutral') AS neutral,
                   COALESCE(AVG(polarity), 0) AS average_polarity
            FROM reviews
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            total_products,
            total_reviews: row.get::<i64, _>("total"),
            positive_reviews: row.get::<i64, _>("positive"),
            negative_reviews: row.get::<i64, _>("negative"),
            neutral_reviews: row.get::<i64, _>("neutral"),
            average_polarity: round3(row.get::<f64, _>("average_polarity")),
        })
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
