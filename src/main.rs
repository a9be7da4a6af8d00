mod api;
mod db;
mod error;
mod file_store;
mod mock;
mod pipeline;
mod scrape;
mod sentiment;
mod store;

use axum::{routing::get, Router};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::store::ReviewStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::search_reviews,
        api::list_products,
        api::list_reviews_for_product,
        api::get_stats,
        api::test_endpoint
    ),
    components(
        schemas(
            api::SearchResponse,
            api::ProductsResponse,
            api::ReviewsResponse,
            api::AppliedFilters,
            api::StatsResponse,
            api::SentimentPercentages,
            crate::pipeline::EnrichedReview,
            crate::sentiment::Sentiment,
            crate::store::ProductRecord,
            crate::store::ReviewRecord,
            crate::store::StoreStats,
            crate::store::StoredOutcome
        )
    ),
    tags(
        (name = "reviews", description = "Review scraping and lookup API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let provider = scrape::ScrapeProvider::from_env();
    let store = select_store().await?;
    let state = Arc::new(api::AppState { provider, store });

    let app = Router::new()
        .merge(SwaggerUi::new("/review-scraper-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::home))
        .route("/api/test", get(api::test_endpoint))
        .route("/api/reviews", get(api::search_reviews))
        .route("/api/reviews/:product_id", get(api::list_reviews_for_product))
        .route("/api/products", get(api::list_products))
        .route("/api/stats", get(api::get_stats))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve the storage backend once at startup: Postgres when `DATABASE_URL`
/// is set and reachable, JSON files otherwise. A dead database is degraded,
/// not fatal.
async fn select_store() -> Result<Arc<dyn ReviewStore>, store::StoreError> {
    if let Ok(db_url) = env::var("DATABASE_URL") {
        if !db_url.is_empty() {
            match PgPoolOptions::new().max_connections(5).connect(&db_url).await {
                Ok(pool) => match db::init_db(&pool).await {
                    Ok(()) => {
                        println!("💾 Connected to Postgres storage.");
                        return Ok(Arc::new(db::PgStore::new(pool)));
                    }
                    Err(e) => eprintln!("⚠️ Database schema init failed: {}", e),
                },
                Err(e) => eprintln!("⚠️ Database connection failed: {}", e),
            }
            println!("   Continuing with file storage...");
        }
    }

    let dir = env::var("STORAGE_DIR").unwrap_or_else(|_| "data".to_string());
    println!("📁 Using JSON file storage in {}/", dir);
    Ok(Arc::new(file_store::FileStore::new(&dir)?))
}
