// src/conversation/transition.rs
//! Pure transition functions. `transition` decides what a turn does,
//! `settle` folds a catalog answer back into state and outbound messages.

use crate::catalog::{CatalogError, SearchOutcome};
use crate::ingredients::IngredientFilter;
use crate::models::drink::DrinkRecord;
use crate::presentation::{failure_notice, render_drink, render_notice, Keyboard, Notice, OutboundMessage};

use super::commands::{Command, InboundEvent};
use super::state::{ConversationState, Flow, SessionFilter, UserSession};

/// A catalog request the engine has to run before the turn can finish.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Random,
    Ingredients(IngredientFilter),
    DrinkName(String),
    IngredientList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryAnswer {
    Drink(DrinkRecord),
    IngredientNames(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Answer straight away.
    Reply {
        notice: Notice,
        next: ConversationState,
        /// Counts as usage; bare menu redisplays do not.
        activity: bool,
    },
    Search(Query),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    pub next: ConversationState,
    pub remember: Option<SessionFilter>,
    pub messages: Vec<OutboundMessage>,
}

pub fn transition(session: &UserSession, event: &InboundEvent) -> Step {
    let state = session.state;

    match event {
        InboundEvent::Command { command, args } => match command {
            Command::Start => reply(Notice::Welcome, ConversationState::Idle, true),
            Command::Help => reply(Notice::Menu, state, false),
            Command::RandomDrink => Step::Search(Query::Random),
            Command::FindByIngredients if args.trim().is_empty() => {
                reply(Notice::PromptIngredients, ConversationState::AwaitingIngredient, true)
            }
            Command::FindByIngredients => ingredient_search(args, state),
            Command::FindDrink => match drink_name(args) {
                Some(name) => Step::Search(Query::DrinkName(name)),
                None => reply(Notice::PromptDrinkName, ConversationState::AwaitingDrinkName, true),
            },
            Command::Next => next_step(session),
            Command::RepeatIngredients => match &session.ingredient_filter {
                Some(filter) => Step::Search(Query::Ingredients(filter.clone())),
                None => reply(Notice::NothingToRepeat, state, true),
            },
            Command::Ingredients => Step::Search(Query::IngredientList),
            Command::Cancel => reply(
                Notice::Menu,
                ConversationState::Idle,
                state != ConversationState::Idle,
            ),
        },
        InboundEvent::UnknownCommand(_) => reply(Notice::Menu, state, false),
        InboundEvent::Text(body) if state.expects_drink_name() => match drink_name(body) {
            Some(name) => Step::Search(Query::DrinkName(name)),
            None => reply(Notice::PromptDrinkName, state, false),
        },
        InboundEvent::Text(body) => ingredient_search(body, state),
    }
}

/// Args that normalize to nothing are invalid input, not a request for the prompt.
fn ingredient_search(raw: &str, state: ConversationState) -> Step {
    match IngredientFilter::parse(raw) {
        Some(filter) => Step::Search(Query::Ingredients(filter)),
        None => reply(Notice::InvalidIngredient, state, true),
    }
}

/// `/next` replays the query behind the drink on screen. Anywhere else it is a
/// no-op that shows the menu.
fn next_step(session: &UserSession) -> Step {
    let replay = match session.state {
        ConversationState::DrinkShown(Flow::Random) => Some(Query::Random),
        ConversationState::DrinkShown(Flow::Ingredients) => {
            session.ingredient_filter.clone().map(Query::Ingredients)
        }
        ConversationState::DrinkShown(Flow::DrinkName) => {
            session.drink_name_filter.clone().map(Query::DrinkName)
        }
        _ => None,
    };

    match replay {
        Some(query) => Step::Search(query),
        None => reply(Notice::Menu, session.state, false),
    }
}

pub fn settle(
    origin: ConversationState,
    query: &Query,
    outcome: Result<SearchOutcome<QueryAnswer>, CatalogError>,
) -> Settled {
    let unchanged = |notice: Notice| Settled {
        next: origin,
        remember: None,
        messages: vec![render_notice(&notice, origin.keyboard())],
    };

    let answer = match outcome {
        Ok(SearchOutcome::Found(answer)) => answer,
        Ok(failed) => {
            let notice = failure_notice(&failed, not_found_notice(query)).unwrap_or(Notice::GenericFault);
            return unchanged(notice);
        }
        Err(_) => return unchanged(Notice::GenericFault),
    };

    match (query, answer) {
        (Query::Random, QueryAnswer::Drink(drink)) => Settled {
            next: ConversationState::DrinkShown(Flow::Random),
            remember: None,
            messages: render_drink(&drink, Keyboard::DrinkActions),
        },
        (Query::Ingredients(filter), QueryAnswer::Drink(drink)) => Settled {
            next: ConversationState::DrinkShown(Flow::Ingredients),
            remember: Some(SessionFilter::Ingredients(filter.clone())),
            messages: render_drink(&drink, Keyboard::DrinkActions),
        },
        (Query::DrinkName(name), QueryAnswer::Drink(drink)) => {
            let mut messages = render_drink(&drink, Keyboard::DrinkActions);
            messages.push(render_notice(&Notice::PromptAnotherDrinkName, Keyboard::DrinkActions));
            Settled {
                next: ConversationState::DrinkShown(Flow::DrinkName),
                remember: Some(SessionFilter::DrinkName(name.clone())),
                messages,
            }
        }
        (Query::IngredientList, QueryAnswer::IngredientNames(names)) => Settled {
            next: origin,
            remember: None,
            messages: vec![render_notice(&Notice::IngredientList(names), origin.keyboard())],
        },
        _ => unchanged(Notice::GenericFault),
    }
}

fn not_found_notice(query: &Query) -> Notice {
    match query {
        Query::DrinkName(_) => Notice::DrinkNameNotFound,
        Query::Ingredients(_) | Query::Random => Notice::NoDrinksFound,
        Query::IngredientList => Notice::GenericFault,
    }
}

fn reply(notice: Notice, next: ConversationState, activity: bool) -> Step {
    Step::Reply {
        notice,
        next,
        activity,
    }
}

fn drink_name(raw: &str) -> Option<String> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::commands::ROUTER;
    use chrono::Utc;

    fn session_in(state: ConversationState) -> UserSession {
        let mut session = UserSession::new(Utc::now());
        session.state = state;
        session
    }

    fn drink() -> DrinkRecord {
        DrinkRecord {
            id: "1".to_string(),
            name: "Margarita".to_string(),
            thumbnail: None,
            ingredients: vec![],
            instructions: "Shake.".to_string(),
        }
    }

    #[test]
    fn test_free_text_in_idle_is_an_ingredient_search() {
        let step = transition(&session_in(ConversationState::Idle), &ROUTER.route("rum, Coke"));
        assert_eq!(
            step,
            Step::Search(Query::Ingredients(IngredientFilter::parse("rum,coke").unwrap()))
        );
    }

    #[test]
    fn test_blank_ingredients_are_invalid_input() {
        let step = transition(&session_in(ConversationState::Idle), &ROUTER.route(" , "));
        assert_eq!(
            step,
            Step::Reply {
                notice: Notice::InvalidIngredient,
                next: ConversationState::Idle,
                activity: true
            }
        );
    }

    #[test]
    fn test_next_in_idle_is_menu_noop() {
        let step = transition(&session_in(ConversationState::Idle), &ROUTER.route("/next"));
        assert_eq!(
            step,
            Step::Reply {
                notice: Notice::Menu,
                next: ConversationState::Idle,
                activity: false
            }
        );
    }

    #[test]
    fn test_next_replays_the_active_flow() {
        let next = ROUTER.route("/next");

        let random = session_in(ConversationState::DrinkShown(Flow::Random));
        assert_eq!(transition(&random, &next), Step::Search(Query::Random));

        let mut by_ingredients = session_in(ConversationState::DrinkShown(Flow::Ingredients));
        by_ingredients.set_filter(SessionFilter::Ingredients(IngredientFilter::parse("gin").unwrap()));
        assert_eq!(
            transition(&by_ingredients, &next),
            Step::Search(Query::Ingredients(IngredientFilter::parse("gin").unwrap()))
        );

        let mut by_name = session_in(ConversationState::DrinkShown(Flow::DrinkName));
        by_name.set_filter(SessionFilter::DrinkName("Margarita".to_string()));
        assert_eq!(
            transition(&by_name, &next),
            Step::Search(Query::DrinkName("Margarita".to_string()))
        );
    }

    #[test]
    fn test_repeat_without_filter_reports_nothing_to_repeat() {
        for state in [
            ConversationState::Idle,
            ConversationState::AwaitingDrinkName,
            ConversationState::DrinkShown(Flow::Random),
        ] {
            let step = transition(&session_in(state), &ROUTER.route("/repeat_ingredients"));
            assert_eq!(
                step,
                Step::Reply {
                    notice: Notice::NothingToRepeat,
                    next: state,
                    activity: true
                }
            );
        }
    }

    #[test]
    fn test_text_while_awaiting_name_is_a_name_search() {
        let step = transition(
            &session_in(ConversationState::AwaitingDrinkName),
            &ROUTER.route("  Bloody   Mary "),
        );
        assert_eq!(step, Step::Search(Query::DrinkName("Bloody Mary".to_string())));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let step = transition(
            &session_in(ConversationState::DrinkShown(Flow::Random)),
            &ROUTER.route("/cancel"),
        );
        assert_eq!(
            step,
            Step::Reply {
                notice: Notice::Menu,
                next: ConversationState::Idle,
                activity: true
            }
        );
    }

    #[test]
    fn test_unknown_command_keeps_state() {
        let step = transition(&session_in(ConversationState::AwaitingIngredient), &ROUTER.route("/shake"));
        assert_eq!(
            step,
            Step::Reply {
                notice: Notice::Menu,
                next: ConversationState::AwaitingIngredient,
                activity: false
            }
        );
    }

    #[test]
    fn test_inline_ingredients_search_immediately() {
        let step = transition(
            &session_in(ConversationState::Idle),
            &ROUTER.route("/find_by_ingredients Gin,  Tonic"),
        );
        assert_eq!(
            step,
            Step::Search(Query::Ingredients(IngredientFilter::parse("gin,tonic").unwrap()))
        );
    }

    #[test]
    fn test_inline_drink_name_searches_immediately() {
        let step = transition(
            &session_in(ConversationState::DrinkShown(Flow::Random)),
            &ROUTER.route("/find_drink margarita"),
        );
        assert_eq!(step, Step::Search(Query::DrinkName("margarita".to_string())));
    }

    #[test]
    fn test_find_commands_without_args_prompt() {
        let idle = session_in(ConversationState::Idle);
        assert_eq!(
            transition(&idle, &ROUTER.route("/find_by_ingredients   ")),
            Step::Reply {
                notice: Notice::PromptIngredients,
                next: ConversationState::AwaitingIngredient,
                activity: true
            }
        );
        assert_eq!(
            transition(&idle, &ROUTER.route("/find_drink")),
            Step::Reply {
                notice: Notice::PromptDrinkName,
                next: ConversationState::AwaitingDrinkName,
                activity: true
            }
        );
    }

    #[test]
    fn test_inline_ingredients_that_normalize_to_nothing_are_invalid() {
        let step = transition(
            &session_in(ConversationState::Idle),
            &ROUTER.route("/find_by_ingredients , ,"),
        );
        assert_eq!(
            step,
            Step::Reply {
                notice: Notice::InvalidIngredient,
                next: ConversationState::Idle,
                activity: true
            }
        );
    }

    #[test]
    fn test_help_keeps_state_without_activity() {
        let state = ConversationState::AwaitingDrinkName;
        assert_eq!(
            transition(&session_in(state), &ROUTER.route("/help")),
            Step::Reply {
                notice: Notice::Menu,
                next: state,
                activity: false
            }
        );
    }

    #[test]
    fn test_start_resets_to_idle() {
        let step = transition(
            &session_in(ConversationState::DrinkShown(Flow::Ingredients)),
            &ROUTER.route("/start"),
        );
        assert_eq!(
            step,
            Step::Reply {
                notice: Notice::Welcome,
                next: ConversationState::Idle,
                activity: true
            }
        );
    }

    #[test]
    fn test_settle_connection_failure_keeps_origin() {
        let settled = settle(
            ConversationState::AwaitingDrinkName,
            &Query::DrinkName("margarita".to_string()),
            Ok(SearchOutcome::ConnectionFailure),
        );
        assert_eq!(settled.next, ConversationState::AwaitingDrinkName);
        assert_eq!(
            settled.messages,
            vec![render_notice(&Notice::ConnectionFailure, Keyboard::CancelOnly)]
        );
    }

    #[test]
    fn test_settle_not_found_keeps_origin() {
        let query = Query::Ingredients(IngredientFilter::parse("unobtainium").unwrap());
        let settled = settle(ConversationState::Idle, &query, Ok(SearchOutcome::NotFound));
        assert_eq!(settled.next, ConversationState::Idle);
        assert_eq!(settled.remember, None);
        assert_eq!(
            settled.messages,
            vec![render_notice(&Notice::NoDrinksFound, Keyboard::MainMenu)]
        );
    }

    #[test]
    fn test_settle_name_search_reprompts() {
        let query = Query::DrinkName("margarita".to_string());
        let settled = settle(
            ConversationState::AwaitingDrinkName,
            &query,
            Ok(SearchOutcome::Found(QueryAnswer::Drink(drink()))),
        );
        assert_eq!(settled.next, ConversationState::DrinkShown(Flow::DrinkName));
        assert_eq!(
            settled.remember,
            Some(SessionFilter::DrinkName("margarita".to_string()))
        );
        assert_eq!(
            settled.messages.last(),
            Some(&render_notice(&Notice::PromptAnotherDrinkName, Keyboard::DrinkActions))
        );
    }

    #[test]
    fn test_settle_malformed_is_generic_fault() {
        let settled = settle(
            ConversationState::DrinkShown(Flow::Random),
            &Query::Random,
            Err(CatalogError::malformed("random", "bad")),
        );
        assert_eq!(settled.next, ConversationState::DrinkShown(Flow::Random));
        assert_eq!(
            settled.messages,
            vec![render_notice(&Notice::GenericFault, Keyboard::DrinkActions)]
        );
    }
}
