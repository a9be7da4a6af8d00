//! Review sources and the startup-selected provider.
//!
//! Two sources implement [`ReviewSource`]: a remote scraper that fetches
//! Amazon search and product pages through the ScraperAPI proxy, and the
//! deterministic mock in [`crate::mock`]. The provider resolves which one is
//! primary once at startup from `SCRAPER_API_KEY`; a remote failure of any
//! kind is logged and recovered by the mock, never surfaced to the caller.

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use std::env;
use std::time::Duration;

use crate::mock::MockScraper;

const SCRAPERAPI_URL: &str = "https://api.scraperapi.com";
const PLACEHOLDER_KEY: &str = "your_scraper_api_key_here";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One scraped review, before sentiment annotation. Only the mock source
/// supplies `rating`; the remote page extraction for it is an open gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawReview {
    pub product: String,
    pub review: String,
    pub title: String,
    pub rating: Option<i64>,
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch reviews for a search query across up to `max_products` products.
    /// An empty vec is a valid non-error result.
    async fn fetch(&self, query: &str, max_products: usize) -> Result<Vec<RawReview>>;

    fn name(&self) -> &'static str;
}

/// Startup-resolved provider: primary source plus the mock fallback used to
/// recover remote failures.
pub struct ScrapeProvider {
    primary: Box<dyn ReviewSource>,
    fallback: Option<MockScraper>,
}

impl ScrapeProvider {
    /// Resolve the provider from `SCRAPER_API_KEY`. Absent or placeholder
    /// value means mock mode; that is documented behavior, not an error.
    pub fn from_env() -> Self {
        let key = env::var("SCRAPER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty() && k != PLACEHOLDER_KEY);

        match key {
            Some(key) => {
                println!("🔑 ScraperAPI key configured. Remote scraping enabled.");
                Self::remote(key)
            }
            None => {
                println!("⚠️ ScraperAPI key not configured. Using mock data for testing.");
                Self::mock()
            }
        }
    }

    pub fn remote(api_key: String) -> Self {
        Self {
            primary: Box::new(RemoteScraper::new(api_key)),
            fallback: Some(MockScraper),
        }
    }

    pub fn mock() -> Self {
        Self {
            primary: Box::new(MockScraper),
            fallback: None,
        }
    }

    /// Single best-effort attempt against the primary source, with the one
    /// provider-to-mock fallback. No retries at this layer.
    pub async fn fetch(&self, query: &str, max_products: usize) -> Result<Vec<RawReview>> {
        match self.primary.fetch(query, max_products).await {
            Ok(reviews) => Ok(reviews),
            Err(e) => match &self.fallback {
                Some(mock) => {
                    eprintln!("⚠️ {} scrape failed: {}", self.primary.name(), e);
                    println!("📝 Falling back to mock data...");
                    mock.fetch(query, max_products).await
                }
                None => Err(e),
            },
        }
    }
}

/// Amazon review scraper going through the ScraperAPI proxy.
pub struct RemoteScraper {
    client: reqwest::Client,
    api_key: String,
}

impl RemoteScraper {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(SCRAPERAPI_URL)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("country_code", "in"),
                ("render", "false"),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ReviewSource for RemoteScraper {
    async fn fetch(&self, query: &str, max_products: usize) -> Result<Vec<RawReview>> {
        let search_url = format!("https://www.amazon.in/s?k={}", urlencoding::encode(query));
        println!("🔎 Searching reviews for: {}", query);

        let search_html = self.get_html(&search_url).await?;
        let products = parse_search_products(&search_html, max_products);
        if products.is_empty() {
            println!("⚠️ No product links matched on the search page.");
        }

        let mut all_reviews = Vec::new();
        for product in products {
            let product_url = format!("https://www.amazon.in{}", product.href);
            let product_html = self.get_html(&product_url).await?;
            for review in parse_review_texts(&product_html) {
                all_reviews.push(RawReview {
                    product: product.name.clone(),
                    review,
                    title: "Product Review".to_string(),
                    rating: None,
                });
            }
        }

        println!("✅ Scraped {} reviews.", all_reviews.len());
        Ok(all_reviews)
    }

    fn name(&self) -> &'static str {
        "scraperapi"
    }
}

struct ProductLink {
    name: String,
    href: String,
}

/// Pull product anchors off an Amazon search page. Selector misses yield a
/// short or empty vec, which callers treat as a valid result.
fn parse_search_products(html: &str, max_products: usize) -> Vec<ProductLink> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.a-link-normal.s-no-outline").unwrap();

    document
        .select(&selector)
        .take(max_products)
        .filter_map(|el| {
            let href = el.value().attr("href")?.to_string();
            let name = el.text().collect::<String>().trim().to_string();
            Some(ProductLink { name, href })
        })
        .collect()
}

/// Collect review body texts from a product page.
fn parse_review_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".review-text-content span").unwrap();

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_HTML: &str = r#"
        <html><body>
          <a class="a-link-normal s-no-outline" href="/dp/B0TEST1"><span>Acme Widget 16GB</span></a>
          <a class="a-link-normal s-no-outline" href="/dp/B0TEST2"><span>Acme Widget Pro</span></a>
          <a class="a-link-normal" href="/dp/B0SPONSORED"><span>Sponsored Thing</span></a>
        </body></html>"#;

    const PRODUCT_HTML: &str = r#"
        <html><body>
          <div class="review-text-content"><span>Really solid widget, works great.</span></div>
          <div class="review-text-content"><span>Stopped working after a week.</span></div>
          <div class="other-content"><span>Not a review.</span></div>
        </body></html>"#;

    #[test]
    fn search_parse_respects_max_products() {
        let products = parse_search_products(SEARCH_HTML, 1);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Acme Widget 16GB");
        assert_eq!(products[0].href, "/dp/B0TEST1");
    }

    #[test]
    fn search_parse_requires_both_classes() {
        let products = parse_search_products(SEARCH_HTML, 10);
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| !p.href.contains("SPONSORED")));
    }

    #[test]
    fn review_parse_collects_span_texts() {
        let reviews = parse_review_texts(PRODUCT_HTML);
        assert_eq!(
            reviews,
            vec![
                "Really solid widget, works great.",
                "Stopped working after a week."
            ]
        );
    }

    #[test]
    fn review_parse_handles_empty_page() {
        assert!(parse_review_texts("<html><body></body></html>").is_empty());
    }

    #[tokio::test]
    async fn mock_provider_fetches_without_network() {
        let provider = ScrapeProvider::mock();
        let reviews = provider.fetch("laptop", 3).await.unwrap();
        assert_eq!(reviews.len(), 3);
    }
}
