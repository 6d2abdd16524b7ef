// src/cocktail_client.rs
// TheCocktailDB API client
// Supports: random drink, lookup by id, search by name, filter by ingredients, ingredient list

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::catalog::{CatalogError, CatalogResult, DrinkCatalog, SearchOutcome};
use crate::ingredients::IngredientFilter;
use crate::models::drink::DrinkRecord;

const PUBLIC_API_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";
const PREMIUM_API_URL: &str = "https://www.thecocktaildb.com/api/json/v2";

#[derive(Debug, Clone)]
pub struct CocktailDbClient {
    client: Client,
    base_url: String,
}

// ============================================================================
// RESPONSE SHAPES
// ============================================================================

/// What the catalog put under `"drinks"`.
///
/// Empty results come back as `null`, as an empty list, or (for the
/// ingredient filter) as a sentinel string such as `"None Found"`.
#[derive(Debug)]
enum DrinksPayload {
    Entries(Vec<Value>),
    NoData,
}

fn parse_drinks_payload(operation: &'static str, body: &str) -> Result<DrinksPayload, CatalogError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::malformed(operation, format!("invalid JSON: {}", e)))?;

    match json.get("drinks") {
        Some(Value::Array(entries)) if entries.is_empty() => Ok(DrinksPayload::NoData),
        Some(Value::Array(entries)) => Ok(DrinksPayload::Entries(entries.clone())),
        Some(Value::Null) | Some(Value::String(_)) => Ok(DrinksPayload::NoData),
        Some(other) => Err(CatalogError::malformed(
            operation,
            format!("unexpected drinks value: {}", other),
        )),
        None => Err(CatalogError::malformed(operation, "missing drinks field")),
    }
}

fn first_drink(operation: &'static str, entries: &[Value]) -> Result<DrinkRecord, CatalogError> {
    entries
        .first()
        .and_then(DrinkRecord::from_catalog)
        .ok_or_else(|| CatalogError::malformed(operation, "entry is not a drink record"))
}

pub(crate) fn parse_random(body: &str) -> CatalogResult<DrinkRecord> {
    match parse_drinks_payload("random", body)? {
        DrinksPayload::Entries(entries) => Ok(SearchOutcome::Found(first_drink("random", &entries)?)),
        DrinksPayload::NoData => Err(CatalogError::malformed("random", "no drink in response")),
    }
}

pub(crate) fn parse_lookup(body: &str) -> CatalogResult<DrinkRecord> {
    // An unknown id yields an empty or non-JSON body rather than an error status.
    if body.trim().is_empty() || serde_json::from_str::<Value>(body).is_err() {
        return Ok(SearchOutcome::NotFound);
    }
    match parse_drinks_payload("lookup", body)? {
        DrinksPayload::Entries(entries) => Ok(SearchOutcome::Found(first_drink("lookup", &entries)?)),
        DrinksPayload::NoData => Ok(SearchOutcome::NotFound),
    }
}

/// One of the name matches, chosen uniformly so `/next` can show another.
fn pick_match(outcome: SearchOutcome<Vec<DrinkRecord>>) -> SearchOutcome<DrinkRecord> {
    match outcome {
        SearchOutcome::Found(drinks) => match drinks.choose(&mut rand::thread_rng()) {
            Some(drink) => SearchOutcome::Found(drink.clone()),
            None => SearchOutcome::NotFound,
        },
        SearchOutcome::NotFound => SearchOutcome::NotFound,
        SearchOutcome::ConnectionFailure => SearchOutcome::ConnectionFailure,
    }
}

pub(crate) fn parse_search(body: &str) -> CatalogResult<Vec<DrinkRecord>> {
    match parse_drinks_payload("search", body)? {
        DrinksPayload::Entries(entries) => {
            let drinks: Vec<DrinkRecord> = entries.iter().filter_map(DrinkRecord::from_catalog).collect();
            if drinks.is_empty() {
                return Err(CatalogError::malformed("search", "no entry is a drink record"));
            }
            Ok(SearchOutcome::Found(drinks))
        }
        DrinksPayload::NoData => Ok(SearchOutcome::NotFound),
    }
}

pub(crate) fn parse_filter(body: &str) -> CatalogResult<Vec<String>> {
    match parse_drinks_payload("filter", body)? {
        DrinksPayload::Entries(entries) => {
            let ids = entries
                .iter()
                .map(|entry| match entry.get("idDrink") {
                    Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
                    Some(Value::Number(id)) => Ok(id.to_string()),
                    _ => Err(CatalogError::malformed("filter", "entry without idDrink")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SearchOutcome::Found(ids))
        }
        DrinksPayload::NoData => Ok(SearchOutcome::NotFound),
    }
}

pub(crate) fn parse_ingredient_list(body: &str) -> CatalogResult<Vec<String>> {
    match parse_drinks_payload("list", body)? {
        DrinksPayload::Entries(entries) => {
            let names: Vec<String> = entries
                .iter()
                .filter_map(|entry| entry.get("strIngredient1").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err(CatalogError::malformed("list", "no ingredient names"));
            }
            Ok(SearchOutcome::Found(names))
        }
        DrinksPayload::NoData => Ok(SearchOutcome::NotFound),
    }
}

// ============================================================================
// IMPLEMENTATION
// ============================================================================

impl CocktailDbClient {
    /// Without an API key the public demo key is used.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = match api_key {
            Some(key) => format!("{}/{}", PREMIUM_API_URL, key),
            None => PUBLIC_API_URL.to_string(),
        };
        Self::with_base_url(base_url, timeout)
    }

    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GETs `<base>/<endpoint>` and returns the body, or `None` on any
    /// transport failure (timeout, DNS, refused, non-2xx).
    async fn fetch(&self, endpoint: &str, query: &[(&str, &str)]) -> Option<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("🍸 Catalog request: {} {:?}", endpoint, query);

        let response = match self.client.get(&url).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Error connecting to the catalog ({}): {}", endpoint, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog returned {} for {}", status, endpoint);
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                error!("Failed to read catalog response ({}): {}", endpoint, e);
                None
            }
        }
    }
}

#[async_trait]
impl DrinkCatalog for CocktailDbClient {
    async fn random_drink(&self) -> CatalogResult<DrinkRecord> {
        match self.fetch("random.php", &[]).await {
            Some(body) => parse_random(&body),
            None => Ok(SearchOutcome::ConnectionFailure),
        }
    }

    async fn drink_by_id(&self, id: &str) -> CatalogResult<DrinkRecord> {
        match self.fetch("lookup.php", &[("i", id)]).await {
            Some(body) => parse_lookup(&body),
            None => Ok(SearchOutcome::ConnectionFailure),
        }
    }

    async fn drink_by_name(&self, name: &str) -> CatalogResult<DrinkRecord> {
        let Some(body) = self.fetch("search.php", &[("s", name)]).await else {
            return Ok(SearchOutcome::ConnectionFailure);
        };
        Ok(pick_match(parse_search(&body)?))
    }

    async fn drink_ids_by_ingredients(&self, filter: &IngredientFilter) -> CatalogResult<Vec<String>> {
        match self.fetch("filter.php", &[("i", filter.as_str())]).await {
            Some(body) => parse_filter(&body),
            None => Ok(SearchOutcome::ConnectionFailure),
        }
    }

    async fn all_ingredients(&self) -> CatalogResult<Vec<String>> {
        match self.fetch("list.php", &[("i", "list")]).await {
            Some(body) => parse_ingredient_list(&body),
            None => Ok(SearchOutcome::ConnectionFailure),
        }
    }
}
