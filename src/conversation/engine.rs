// src/conversation/engine.rs
//! Drives one turn per inbound event: lock the user's session, decide, query
//! the catalog when needed, deliver the replies, then commit usage.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::catalog::{random_drink_by_ingredients, CatalogError, DrinkCatalog, SearchOutcome};
use crate::presentation::{render_notice, OutboundMessage};
use crate::services::session_store::SessionStore;

use super::commands::InboundEvent;
use super::transition::{settle, transition, Query, QueryAnswer, Step};

/// Outbound side of the chat transport.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn deliver(&self, user_id: i64, message: &OutboundMessage) -> Result<(), String>;
}

pub struct ConversationEngine {
    catalog: Arc<dyn DrinkCatalog>,
    sessions: Arc<SessionStore>,
}

impl ConversationEngine {
    pub fn new(catalog: Arc<dyn DrinkCatalog>, sessions: Arc<SessionStore>) -> Self {
        Self { catalog, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Processes one event to completion. Never fails: every fault becomes a
    /// user-facing message.
    pub async fn handle(&self, user_id: i64, event: InboundEvent, sink: &dyn OutboundSink) {
        let handle = self.sessions.get(user_id).await;
        let mut session = handle.lock().await;
        let now = Utc::now();

        let origin = session.state;
        let (messages, activity) = match transition(&session, &event) {
            Step::Reply { notice, next, activity } => {
                session.state = next;
                (vec![render_notice(&notice, next.keyboard())], activity)
            }
            Step::Search(query) => {
                let outcome = self.run(&query).await;
                if let Err(e) = &outcome {
                    error!(user_id, query = ?query, "Catalog fault: {}", e);
                }
                let settled = settle(origin, &query, outcome);
                session.state = settled.next;
                if let Some(filter) = settled.remember {
                    session.set_filter(filter);
                }
                (settled.messages, true)
            }
        };
        session.last_active = now;

        info!(user_id, from = ?origin, to = ?session.state, "Turn processed");

        for message in &messages {
            if let Err(e) = sink.deliver(user_id, message).await {
                warn!(user_id, "Failed to deliver message: {}", e);
            }
        }

        if activity {
            match self.sessions.record_activity(user_id, now).await {
                Ok(record) => debug!(user_id, started = %record.date_started, "Usage updated"),
                Err(e) => error!(user_id, "Failed to record usage: {}", e),
            }
        }
    }

    async fn run(&self, query: &Query) -> Result<SearchOutcome<QueryAnswer>, CatalogError> {
        let catalog = self.catalog.as_ref();
        let outcome = match query {
            Query::Random => catalog.random_drink().await?.map(QueryAnswer::Drink),
            Query::Ingredients(filter) => random_drink_by_ingredients(catalog, filter)
                .await?
                .map(QueryAnswer::Drink),
            Query::DrinkName(name) => catalog.drink_by_name(name).await?.map(QueryAnswer::Drink),
            Query::IngredientList => catalog
                .all_ingredients()
                .await?
                .map(QueryAnswer::IngredientNames),
        };
        Ok(outcome)
    }
}
