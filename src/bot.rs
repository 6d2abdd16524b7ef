// src/bot.rs
//! Glue between the Telegram transport and the conversation engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::conversation::{ConversationEngine, InboundEvent, OutboundSink, ROUTER};
use crate::models::telegram::Update;
use crate::telegram_client::{TelegramClient, TelegramError};

/// Server-side wait for `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);
/// A user's worker exits after this long without events.
const QUEUE_IDLE: Duration = Duration::from_secs(300);

type UserQueue = mpsc::UnboundedSender<InboundEvent>;

pub struct Bot {
    engine: Arc<ConversationEngine>,
    telegram: Arc<TelegramClient>,
    sink: Arc<dyn OutboundSink>,
    queues: Mutex<HashMap<i64, UserQueue>>,
}

impl Bot {
    pub fn new(engine: Arc<ConversationEngine>, telegram: Arc<TelegramClient>) -> Self {
        let sink = telegram.clone();
        Self::with_sink(engine, telegram, sink)
    }

    pub fn with_sink(
        engine: Arc<ConversationEngine>,
        telegram: Arc<TelegramClient>,
        sink: Arc<dyn OutboundSink>,
    ) -> Self {
        Self {
            engine,
            telegram,
            sink,
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn telegram(&self) -> &TelegramClient {
        &self.telegram
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// Queues every update on its user's worker. A user's events are handled
    /// one at a time in arrival order, across batches and webhook calls;
    /// different users proceed independently.
    pub fn dispatch(self: &Arc<Self>, updates: Vec<Update>) {
        let mut queues = self.lock_queues();
        for update in updates {
            let Some((user_id, event)) = event_from_update(&update) else {
                debug!(update_id = update.update_id, "Ignoring non-text update");
                continue;
            };

            let event = match queues.get(&user_id) {
                Some(queue) => match queue.send(event) {
                    Ok(()) => continue,
                    Err(mpsc::error::SendError(event)) => event,
                },
                None => event,
            };

            let (queue, events) = mpsc::unbounded_channel();
            if queue.send(event).is_ok() {
                queues.insert(user_id, queue);
                tokio::spawn(Arc::clone(self).drain_queue(user_id, events));
            }
        }
    }

    async fn drain_queue(self: Arc<Self>, user_id: i64, mut events: mpsc::UnboundedReceiver<InboundEvent>) {
        loop {
            let event = match tokio::time::timeout(QUEUE_IDLE, events.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => return,
                Err(_) => {
                    // Senders only push while holding the map lock, so an empty
                    // queue seen under the lock stays empty once unregistered.
                    let mut queues = self.lock_queues();
                    match events.try_recv() {
                        Ok(event) => event,
                        Err(_) => {
                            queues.remove(&user_id);
                            debug!(user_id, "User queue idle, worker stopped");
                            return;
                        }
                    }
                }
            };
            self.engine.handle(user_id, event, self.sink.as_ref()).await;
        }
    }

    fn lock_queues(&self) -> MutexGuard<'_, HashMap<i64, UserQueue>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Long-polls `getUpdates` forever. Only fails if the webhook cannot be
    /// cleared at startup.
    pub async fn run_polling(self: Arc<Self>) -> Result<(), TelegramError> {
        self.telegram.delete_webhook().await?;
        info!("📡 Long polling for updates...");

        let mut offset = 0;
        loop {
            match self.telegram.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    if let Some(last) = updates.iter().map(|u| u.update_id).max() {
                        offset = last + 1;
                    }
                    debug!(count = updates.len(), offset, "Received updates");
                    self.dispatch(updates);
                }
                Err(e) => {
                    error!("❌ Polling for updates failed: {}", e);
                    tokio::time::sleep(POLL_ERROR_DELAY).await;
                }
            }
        }
    }
}

/// The chat id and classified event for a text message; `None` for anything else.
pub fn event_from_update(update: &Update) -> Option<(i64, InboundEvent)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    Some((message.chat.id, ROUTER.route(text)))
}
