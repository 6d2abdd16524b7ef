// src/ingredients.rs
//! Canonical form of free-text ingredient input.
//!
//! Every flow that accepts ingredients goes through [`normalize_ingredients`], so
//! the same text always produces the same catalog query key.

use std::fmt;

/// Splits on commas, trims each term, collapses inner whitespace, lower-cases,
/// drops empty terms and rejoins with a bare comma.
///
/// `"Rum, Coke"` becomes `"rum,coke"`. The function is idempotent.
pub fn normalize_ingredients(raw: &str) -> String {
    raw.split(',')
        .map(|term| term.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|term| !term.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// A normalized, non-empty ingredient query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngredientFilter(String);

impl IngredientFilter {
    /// `None` when the input holds no ingredient at all (e.g. `" , ,"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_ingredients(raw);
        (!normalized.is_empty()).then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
