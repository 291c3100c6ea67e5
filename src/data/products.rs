//! Fake Store API client
//!
//! Fetches the product catalogue. Unlike the character endpoint, the response
//! is a bare JSON array.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::{fetch_body, FetchError, Item, ItemDetail};

/// Base URL for the Fake Store API
const FAKE_STORE_BASE_URL: &str = "https://fakestoreapi.com";

/// A single product record from the API
#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: u64,
    title: String,
    price: f64,
    category: String,
    image: String,
}

impl From<ProductRecord> for Item {
    fn from(record: ProductRecord) -> Self {
        Item {
            id: record.id,
            name: record.title,
            category: record.category,
            detail: ItemDetail::Product {
                price: record.price,
                image: record.image,
            },
        }
    }
}

/// Client for fetching products from the Fake Store API
#[derive(Debug, Clone)]
pub struct ProductsClient {
    client: Client,
    base_url: String,
    delay: Duration,
}

impl Default for ProductsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductsClient {
    pub fn new() -> Self {
        Self::with_base_url(FAKE_STORE_BASE_URL)
    }

    /// Creates a new ProductsClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetches every product in the catalogue
    pub async fn fetch_items(&self) -> Result<Vec<Item>, FetchError> {
        info!("Fetching products");
        let url = format!("{}/products", self.base_url);
        let text = fetch_body(&self.client, &url, self.delay).await?;
        let records: Vec<ProductRecord> = serde_json::from_str(&text)?;

        Ok(records.into_iter().map(Item::from).collect())
    }
}
