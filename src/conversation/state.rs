// src/conversation/state.rs
use chrono::{DateTime, Utc};

use crate::ingredients::IngredientFilter;
use crate::presentation::Keyboard;

/// Which query produced the drink currently on screen; `/next` replays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Random,
    Ingredients,
    DrinkName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingIngredient,
    AwaitingDrinkName,
    DrinkShown(Flow),
}

impl ConversationState {
    pub fn keyboard(&self) -> Keyboard {
        match self {
            ConversationState::Idle => Keyboard::MainMenu,
            ConversationState::AwaitingIngredient | ConversationState::AwaitingDrinkName => {
                Keyboard::CancelOnly
            }
            ConversationState::DrinkShown(_) => Keyboard::DrinkActions,
        }
    }

    /// Free text in these states is a drink name rather than ingredients.
    pub fn expects_drink_name(&self) -> bool {
        matches!(
            self,
            ConversationState::AwaitingDrinkName | ConversationState::DrinkShown(Flow::DrinkName)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionFilter {
    Ingredients(IngredientFilter),
    DrinkName(String),
}

/// Ephemeral per-user context. Only the conversation engine mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSession {
    pub state: ConversationState,
    pub ingredient_filter: Option<IngredientFilter>,
    pub drink_name_filter: Option<String>,
    pub last_active: DateTime<Utc>,
}

impl UserSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: ConversationState::Idle,
            ingredient_filter: None,
            drink_name_filter: None,
            last_active: now,
        }
    }

    pub fn set_filter(&mut self, filter: SessionFilter) {
        match filter {
            SessionFilter::Ingredients(filter) => self.ingredient_filter = Some(filter),
            SessionFilter::DrinkName(name) => self.drink_name_filter = Some(name),
        }
    }
}
