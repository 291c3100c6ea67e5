//! Core data models for cachegrid
//!
//! This module contains the item types shown in the grid, the sources they are
//! fetched from, and the error type shared by the HTTP clients.

pub mod characters;
pub mod products;

pub use characters::CharactersClient;
pub use products::ProductsClient;

use chrono::Duration;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::cache::{Clock, FetchResult, MemoizedFetcher};

/// A memoized fetcher over the items of one source
pub type ItemFetcher = MemoizedFetcher<Vec<Item>, FetchError>;

/// The result handed to the UI: items plus when they were fetched
pub type ItemFetchResult = FetchResult<Vec<Item>>;

/// A single card in the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Identifier assigned by the upstream API
    pub id: u64,
    /// Display name
    pub name: String,
    /// Secondary label (character status or product category)
    pub category: String,
    /// Fields that only one source provides
    pub detail: ItemDetail,
}

/// Source-specific item fields
#[derive(Debug, Clone, PartialEq)]
pub enum ItemDetail {
    Character { species: String, image: String },
    Product { price: f64, image: String },
}

impl Item {
    /// Image URL of the item
    pub fn image(&self) -> &str {
        match &self.detail {
            ItemDetail::Character { image, .. } | ItemDetail::Product { image, .. } => image,
        }
    }

    /// The line shown under the ID: species for characters, price for products
    pub fn detail_line(&self) -> String {
        match &self.detail {
            ItemDetail::Character { species, .. } => format!("Species: {}", species),
            ItemDetail::Product { price, .. } => format!("Price: ${:.2}", price),
        }
    }
}

/// Upstream APIs items can be fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Rick and Morty characters
    #[default]
    Characters,
    /// Fake Store products
    Products,
}

impl Source {
    /// Parses a source name, accepting a few aliases
    pub fn from_name(s: &str) -> Option<Source> {
        match s.to_lowercase().trim() {
            "characters" | "character" | "rick" => Some(Source::Characters),
            "products" | "product" | "store" => Some(Source::Products),
            _ => None,
        }
    }

    /// Plural noun used in the header ("Total Characters: 20")
    pub fn label(&self) -> &'static str {
        match self {
            Source::Characters => "Characters",
            Source::Products => "Products",
        }
    }

    /// Human-readable name of the upstream API
    pub fn api_name(&self) -> &'static str {
        match self {
            Source::Characters => "Rick and Morty API",
            Source::Products => "Fake Store API",
        }
    }

    /// Public homepage of the upstream API
    pub fn homepage(&self) -> &'static str {
        match self {
            Source::Characters => "https://rickandmortyapi.com/",
            Source::Products => "https://fakestoreapi.com/",
        }
    }
}

/// Errors that can occur when fetching items
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the failure happened on the network side rather than while decoding
    pub fn is_network(&self) -> bool {
        !matches!(self, FetchError::Parse(_))
    }
}

/// Builds the memoized fetcher for `source`
///
/// # Arguments
/// * `source` - Which API to fetch from
/// * `delay` - Artificial delay applied after each response (demo loading state)
/// * `ttl` - How long fetched items stay fresh
/// * `clock` - Time source for expiry
pub fn item_fetcher(
    source: Source,
    delay: std::time::Duration,
    ttl: Duration,
    clock: Arc<dyn Clock>,
) -> ItemFetcher {
    match source {
        Source::Characters => {
            let client = CharactersClient::new().with_delay(delay);
            MemoizedFetcher::new(ttl, clock, move || {
                let client = client.clone();
                async move { client.fetch_items().await }
            })
        }
        Source::Products => {
            let client = ProductsClient::new().with_delay(delay);
            MemoizedFetcher::new(ttl, clock, move || {
                let client = client.clone();
                async move { client.fetch_items().await }
            })
        }
    }
}

/// GETs `url` and returns the body of a successful response
///
/// The artificial `delay` runs after the body has been read, so it stretches
/// the loading state without affecting what is returned.
pub(crate) async fn fetch_body(
    client: &Client,
    url: &str,
    delay: std::time::Duration,
) -> Result<String, FetchError> {
    debug!(%url, "sending request");
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let text = response.text().await?;

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn character(id: u64) -> Item {
        Item {
            id,
            name: "Rick Sanchez".to_string(),
            category: "Alive".to_string(),
            detail: ItemDetail::Character {
                species: "Human".to_string(),
                image: "https://example.com/1.jpeg".to_string(),
            },
        }
    }

    #[test]
    fn test_source_from_name_aliases() {
        assert_eq!(Source::from_name("characters"), Some(Source::Characters));
        assert_eq!(Source::from_name("Character"), Some(Source::Characters));
        assert_eq!(Source::from_name("rick"), Some(Source::Characters));
        assert_eq!(Source::from_name("products"), Some(Source::Products));
        assert_eq!(Source::from_name(" STORE "), Some(Source::Products));
        assert_eq!(Source::from_name("planets"), None);
    }

    #[test]
    fn test_source_default_is_characters() {
        assert_eq!(Source::default(), Source::Characters);
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(Source::Characters.label(), "Characters");
        assert_eq!(Source::Products.label(), "Products");
        assert_eq!(Source::Characters.api_name(), "Rick and Morty API");
        assert!(Source::Products.homepage().contains("fakestoreapi"));
    }

    #[test]
    fn test_item_detail_line() {
        assert_eq!(character(1).detail_line(), "Species: Human");

        let product = Item {
            id: 7,
            name: "Backpack".to_string(),
            category: "men's clothing".to_string(),
            detail: ItemDetail::Product {
                price: 109.95,
                image: "https://example.com/7.jpg".to_string(),
            },
        };
        assert_eq!(product.detail_line(), "Price: $109.95");
        assert_eq!(product.image(), "https://example.com/7.jpg");
    }

    #[test]
    fn test_item_fetcher_starts_empty_for_each_source() {
        let clock = ManualClock::default();
        for source in [Source::Characters, Source::Products] {
            let fetcher = item_fetcher(
                source,
                std::time::Duration::ZERO,
                Duration::seconds(30),
                Arc::new(clock.clone()),
            );

            assert_eq!(fetcher.ttl(), Duration::seconds(30));
            assert!(!fetcher.is_fresh());
            assert!(fetcher.peek().is_none());
            assert!(fetcher.expires_at().is_none());
        }
    }

    #[test]
    fn test_fetch_error_taxonomy() {
        let parse = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!FetchError::Parse(parse).is_network());
        assert!(FetchError::Status(503).is_network());
        assert_eq!(
            FetchError::Status(404).to_string(),
            "Unexpected HTTP status: 404"
        );
    }
}
