// src/presentation.rs
//! Maps drink results and engine conditions onto outbound message parts.
//!
//! Everything here is pure. The transport decides how a [`Keyboard`] is drawn.

use crate::catalog::SearchOutcome;
use crate::conversation::commands::COMMAND_TABLE;
use crate::models::drink::DrinkRecord;

/// The logical option set offered with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    MainMenu,
    DrinkActions,
    CancelOnly,
}

impl Keyboard {
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            Keyboard::MainMenu => &[
                "/random_drink",
                "/find_by_ingredients",
                "/find_drink",
                "/repeat_ingredients",
            ],
            Keyboard::DrinkActions => &["/next", "/cancel"],
            Keyboard::CancelOnly => &["/cancel"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Photo { uri: String },
    Text { body: String, keyboard: Option<Keyboard> },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundMessage::Text {
            body: body.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(body: impl Into<String>, keyboard: Keyboard) -> Self {
        OutboundMessage::Text {
            body: body.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// User-facing conditions that render as a single text message.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Welcome,
    Menu,
    PromptIngredients,
    PromptDrinkName,
    PromptAnotherDrinkName,
    NoDrinksFound,
    DrinkNameNotFound,
    ConnectionFailure,
    NothingToRepeat,
    InvalidIngredient,
    GenericFault,
    IngredientList(Vec<String>),
}

/// Photo, title, ingredient block, instructions. Empty parts are skipped and the
/// keyboard rides on the last text part.
pub fn render_drink(drink: &DrinkRecord, keyboard: Keyboard) -> Vec<OutboundMessage> {
    let mut parts = Vec::with_capacity(4);

    if let Some(uri) = &drink.thumbnail {
        parts.push(OutboundMessage::Photo { uri: uri.clone() });
    }

    let mut texts = vec![drink.name.clone()];
    if !drink.ingredients.is_empty() {
        texts.push(drink.ingredient_block());
    }
    if !drink.instructions.is_empty() {
        texts.push(drink.instructions.clone());
    }

    let last = texts.len() - 1;
    for (i, body) in texts.into_iter().enumerate() {
        if i == last {
            parts.push(OutboundMessage::with_keyboard(body, keyboard));
        } else {
            parts.push(OutboundMessage::text(body));
        }
    }

    parts
}

pub fn render_notice(notice: &Notice, keyboard: Keyboard) -> OutboundMessage {
    OutboundMessage::with_keyboard(notice_text(notice), keyboard)
}

/// The notice for a failed search, or `None` when the search found something.
pub fn failure_notice<T>(outcome: &SearchOutcome<T>, not_found: Notice) -> Option<Notice> {
    match outcome {
        SearchOutcome::Found(_) => None,
        SearchOutcome::NotFound => Some(not_found),
        SearchOutcome::ConnectionFailure => Some(Notice::ConnectionFailure),
    }
}

pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::Welcome => format!(
            "Hey! I can help you pick a drink 🍹\n\n{}\n\nOr just send me ingredients, separated by commas.",
            command_help()
        ),
        Notice::Menu => format!("What would you like to do?\n\n{}", command_help()),
        Notice::PromptIngredients => {
            "Send me the ingredients you have, separated by commas (e.g. rum, coke).".to_string()
        }
        Notice::PromptDrinkName => "Send me the name of a drink.".to_string(),
        Notice::PromptAnotherDrinkName => {
            "Send me another drink name, /next for another match, or /cancel.".to_string()
        }
        Notice::NoDrinksFound => "No drinks found with these ingredients. Try something else.".to_string(),
        Notice::DrinkNameNotFound => "I couldn't find a drink with that name. Try another one.".to_string(),
        Notice::ConnectionFailure => {
            "I can't reach the drink catalog right now. Please try again in a moment.".to_string()
        }
        Notice::NothingToRepeat => {
            "Nothing to repeat yet. Send me some ingredients first.".to_string()
        }
        Notice::InvalidIngredient => {
            "That doesn't look like an ingredient list. Try something like: gin, tonic".to_string()
        }
        Notice::GenericFault => "Something went wrong on my side. Please try again.".to_string(),
        Notice::IngredientList(names) => {
            format!("Ingredients I know about:\n{}", names.join("\n"))
        }
    }
}

fn command_help() -> String {
    COMMAND_TABLE
        .iter()
        .filter(|entry| entry.listed)
        .map(|entry| format!("/{} - {}", entry.name, entry.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::drink::IngredientEntry;

    fn rum_and_coke() -> DrinkRecord {
        DrinkRecord {
            id: "11288".to_string(),
            name: "Cuba Libre".to_string(),
            thumbnail: Some("https://example.com/cuba.jpg".to_string()),
            ingredients: vec![
                IngredientEntry {
                    measure: Some("2 oz".to_string()),
                    name: "rum".to_string(),
                },
                IngredientEntry {
                    measure: Some("1 can".to_string()),
                    name: "coke".to_string(),
                },
            ],
            instructions: "Pour over ice.".to_string(),
        }
    }

    #[test]
    fn test_drink_renders_in_order() {
        let parts = render_drink(&rum_and_coke(), Keyboard::DrinkActions);
        assert_eq!(
            parts,
            vec![
                OutboundMessage::Photo {
                    uri: "https://example.com/cuba.jpg".to_string()
                },
                OutboundMessage::text("Cuba Libre"),
                OutboundMessage::text("2 oz rum\n1 can coke"),
                OutboundMessage::with_keyboard("Pour over ice.", Keyboard::DrinkActions),
            ]
        );
    }

    #[test]
    fn test_drink_without_photo_or_instructions() {
        let mut drink = rum_and_coke();
        drink.thumbnail = None;
        drink.instructions.clear();

        let parts = render_drink(&drink, Keyboard::MainMenu);
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[1],
            OutboundMessage::with_keyboard("2 oz rum\n1 can coke", Keyboard::MainMenu)
        );
    }

    #[test]
    fn test_failure_notice_per_variant() {
        assert_eq!(
            failure_notice(&SearchOutcome::<()>::NotFound, Notice::NoDrinksFound),
            Some(Notice::NoDrinksFound)
        );
        assert_eq!(
            failure_notice(&SearchOutcome::<()>::ConnectionFailure, Notice::NoDrinksFound),
            Some(Notice::ConnectionFailure)
        );
        assert_eq!(failure_notice(&SearchOutcome::Found(()), Notice::NoDrinksFound), None);
    }

    #[test]
    fn test_menu_lists_commands() {
        let text = notice_text(&Notice::Menu);
        assert!(text.contains("/random_drink"));
        assert!(text.contains("/find_drink"));
        assert!(text.contains("/repeat_ingredients"));
    }
}
