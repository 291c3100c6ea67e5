//! Rick and Morty API client
//!
//! Fetches the first page of characters from the Rick and Morty API and maps
//! them into grid items.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::{fetch_body, FetchError, Item, ItemDetail};

/// Base URL for the Rick and Morty API
const RICK_AND_MORTY_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// Response from the character endpoint: an object wrapping the result array
#[derive(Debug, Deserialize)]
struct CharacterPage {
    results: Vec<CharacterRecord>,
}

/// A single character record from the API
#[derive(Debug, Deserialize)]
struct CharacterRecord {
    id: u64,
    name: String,
    /// "Alive", "Dead" or "unknown"
    status: String,
    species: String,
    image: String,
}

impl From<CharacterRecord> for Item {
    fn from(record: CharacterRecord) -> Self {
        Item {
            id: record.id,
            name: record.name,
            category: record.status,
            detail: ItemDetail::Character {
                species: record.species,
                image: record.image,
            },
        }
    }
}

/// Client for fetching characters from the Rick and Morty API
#[derive(Debug, Clone)]
pub struct CharactersClient {
    client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
    /// Artificial delay after each response
    delay: Duration,
}

impl Default for CharactersClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CharactersClient {
    /// Creates a new CharactersClient pointing at the public API
    pub fn new() -> Self {
        Self::with_base_url(RICK_AND_MORTY_BASE_URL)
    }

    /// Creates a new CharactersClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            delay: Duration::ZERO,
        }
    }

    /// Sets the artificial delay applied after each response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetches all characters on the first page
    ///
    /// # Returns
    /// * `Ok(Vec<Item>)` - Characters in API order
    /// * `Err(FetchError)` - If the request fails, the status is not a success,
    ///   or the body is not a character page
    pub async fn fetch_items(&self) -> Result<Vec<Item>, FetchError> {
        info!("Fetching characters");
        let url = format!("{}/character", self.base_url);
        let text = fetch_body(&self.client, &url, self.delay).await?;
        let page: CharacterPage = serde_json::from_str(&text)?;

        Ok(page.results.into_iter().map(Item::from).collect())
    }
}
