// src/services/session_store.rs
//! Ephemeral per-user sessions plus the durable usage record.
//!
//! Each session sits behind its own mutex, so one user's turn never waits on
//! another user's. The map lock is only held to find or insert an entry.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use super::usage_tracking::UsageStore;
use crate::conversation::state::UserSession;
use crate::models::usage::UsageRecord;

pub type SharedSession = Arc<Mutex<UserSession>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<i64, SharedSession>>,
    usage: Arc<dyn UsageStore>,
}

impl SessionStore {
    pub fn new(usage: Arc<dyn UsageStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            usage,
        }
    }

    /// The user's session, created `Idle` with no filters on first use.
    pub async fn get(&self, user_id: i64) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(&user_id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(UserSession::new(Utc::now()))))
            .clone()
    }

    pub async fn record_activity(&self, user_id: i64, now: DateTime<Utc>) -> Result<UsageRecord, sqlx::Error> {
        self.usage.record_activity(user_id, now).await
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than `ttl`. Sessions in use by a turn are kept.
    pub async fn evict_idle(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| {
            if Arc::strong_count(session) > 1 {
                return true;
            }
            match session.try_lock() {
                Ok(guard) => now.signed_duration_since(guard.last_active) <= ttl,
                Err(_) => true,
            }
        });

        before - sessions.len()
    }

    /// Periodically evicts sessions idle for longer than `ttl`.
    pub fn spawn_sweeper(self: Arc<Self>, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let period = (ttl / 4).clamp(Duration::from_secs(30), Duration::from_secs(600));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = self.evict_idle(ttl, Utc::now()).await;
                if evicted > 0 {
                    let remaining = self.len().await;
                    tracing::info!(evicted, remaining, "🧹 Evicted idle sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::state::{ConversationState, SessionFilter};
    use crate::ingredients::IngredientFilter;
    use crate::services::usage_tracking::memory::MemoryUsageStore;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryUsageStore::default()))
    }

    #[tokio::test]
    async fn test_get_creates_idle_session() {
        let store = store();
        let session = store.get(1).await;
        let session = session.lock().await;
        assert_eq!(session.state, ConversationState::Idle);
        assert_eq!(session.ingredient_filter, None);
        assert_eq!(session.drink_name_filter, None);
    }

    #[tokio::test]
    async fn test_get_returns_same_session() {
        let store = store();
        store
            .get(1)
            .await
            .lock()
            .await
            .set_filter(SessionFilter::Ingredients(IngredientFilter::parse("gin").unwrap()));

        let session = store.get(1).await;
        assert_eq!(
            session.lock().await.ingredient_filter,
            IngredientFilter::parse("gin")
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_users_do_not_block_each_other() {
        let store = store();
        let first = store.get(1).await;
        let _held = first.lock().await;

        let second = store.get(2).await;
        assert!(second.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_evict_idle_sessions() {
        let store = store();
        let now = Utc::now();
        {
            let stale = store.get(1).await;
            stale.lock().await.last_active = now - chrono::Duration::hours(30);
        }
        store.get(2).await;

        let evicted = store.evict_idle(Duration::from_secs(24 * 3600), now).await;
        assert_eq!(evicted, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_evict_keeps_sessions_in_use() {
        let store = store();
        let now = Utc::now();
        let in_use = store.get(1).await;
        in_use.lock().await.last_active = now - chrono::Duration::hours(30);

        assert_eq!(store.evict_idle(Duration::from_secs(60), now).await, 0);
        drop(in_use);
        assert_eq!(store.evict_idle(Duration::from_secs(60), now).await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_task_evicts_on_first_tick() {
        let store = Arc::new(store());
        {
            let stale = store.get(1).await;
            stale.lock().await.last_active = Utc::now() - chrono::Duration::hours(30);
        }

        let sweeper = store.clone().spawn_sweeper(Duration::from_secs(24 * 3600));
        for _ in 0..100 {
            if store.len().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        sweeper.abort();
        assert_eq!(store.len().await, 0);
    }
}
