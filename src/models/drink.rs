// src/models/drink.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The catalog exposes ingredient slots `strIngredient1..=strIngredient16`.
pub const MAX_INGREDIENTS_IN_DRINK: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub measure: Option<String>,
    pub name: String,
}

impl IngredientEntry {
    /// "2 oz rum" when a measure is present, plain "rum" otherwise.
    pub fn to_line(&self) -> String {
        match &self.measure {
            Some(measure) => format!("{} {}", measure, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub ingredients: Vec<IngredientEntry>,
    pub instructions: String,
}

impl DrinkRecord {
    /// Reads one entry of the catalog's `drinks` array.
    ///
    /// Returns `None` when the object lacks an id or a name. Ingredient slots are
    /// read in order and the first empty slot ends the list.
    pub fn from_catalog(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let id = match obj.get("idDrink")? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let name = non_empty(obj.get("strDrink"))?;

        let mut ingredients = Vec::new();
        for slot in 1..=MAX_INGREDIENTS_IN_DRINK {
            let Some(ingredient) = non_empty(obj.get(&format!("strIngredient{}", slot))) else {
                break;
            };
            ingredients.push(IngredientEntry {
                measure: non_empty(obj.get(&format!("strMeasure{}", slot))),
                name: ingredient,
            });
        }

        Some(Self {
            id,
            name,
            thumbnail: non_empty(obj.get("strDrinkThumb")),
            ingredients,
            instructions: non_empty(obj.get("strInstructions")).unwrap_or_default(),
        })
    }

    pub fn ingredient_lines(&self) -> Vec<String> {
        self.ingredients.iter().map(IngredientEntry::to_line).collect()
    }

    /// All ingredients, one per line, in slot order.
    pub fn ingredient_block(&self) -> String {
        self.ingredient_lines().join("\n")
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
