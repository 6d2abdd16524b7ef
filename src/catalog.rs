// src/catalog.rs
//! The drink catalog seam: outcome types, faults, and the composite lookups the
//! conversation engine issues.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::ingredients::IngredientFilter;
use crate::models::drink::DrinkRecord;

/// Result of a single catalog query. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T = DrinkRecord> {
    Found(T),
    NotFound,
    ConnectionFailure,
}

impl<T> SearchOutcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> SearchOutcome<U> {
        match self {
            SearchOutcome::Found(value) => SearchOutcome::Found(f(value)),
            SearchOutcome::NotFound => SearchOutcome::NotFound,
            SearchOutcome::ConnectionFailure => SearchOutcome::ConnectionFailure,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

/// Local faults. Transport failures are not errors here; they are
/// [`SearchOutcome::ConnectionFailure`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Malformed catalog response for {operation}: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },
    #[error("Cannot pick a drink from an empty list")]
    EmptyInput,
}

impl CatalogError {
    pub fn malformed(operation: &'static str, reason: impl Into<String>) -> Self {
        CatalogError::MalformedResponse {
            operation,
            reason: reason.into(),
        }
    }
}

pub type CatalogResult<T> = Result<SearchOutcome<T>, CatalogError>;

#[async_trait]
pub trait DrinkCatalog: Send + Sync {
    /// Always `Found` unless the transport fails.
    async fn random_drink(&self) -> CatalogResult<DrinkRecord>;

    /// `NotFound` when the catalog has nothing parseable for `id`.
    async fn drink_by_id(&self, id: &str) -> CatalogResult<DrinkRecord>;

    /// Any drink whose name matches `name`, as judged by the catalog.
    async fn drink_by_name(&self, name: &str) -> CatalogResult<DrinkRecord>;

    /// Ids of every drink containing all of the filter's ingredients.
    async fn drink_ids_by_ingredients(&self, filter: &IngredientFilter) -> CatalogResult<Vec<String>>;

    /// Every ingredient name the catalog knows.
    async fn all_ingredients(&self) -> CatalogResult<Vec<String>>;
}

/// Uniform random choice among `ids`.
pub fn pick_random_id(ids: &[String]) -> Result<&str, CatalogError> {
    ids.choose(&mut rand::thread_rng())
        .map(String::as_str)
        .ok_or(CatalogError::EmptyInput)
}

/// Filter by ingredients, pick one id at random, then look the drink up.
pub async fn random_drink_by_ingredients<C>(
    catalog: &C,
    filter: &IngredientFilter,
) -> CatalogResult<DrinkRecord>
where
    C: DrinkCatalog + ?Sized,
{
    let ids = match catalog.drink_ids_by_ingredients(filter).await? {
        SearchOutcome::Found(ids) => ids,
        SearchOutcome::NotFound => return Ok(SearchOutcome::NotFound),
        SearchOutcome::ConnectionFailure => return Ok(SearchOutcome::ConnectionFailure),
    };

    let id = pick_random_id(&ids)?.to_string();
    tracing::debug!(filter = %filter, candidates = ids.len(), drink_id = %id, "picked drink for ingredients");

    catalog.drink_by_id(&id).await
}
