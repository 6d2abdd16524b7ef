// src/services/usage_tracking.rs
// Durable first-seen / last-seen timestamps per user (the `users` table)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::usage::UsageRecord;

#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Upserts the user's record: creates it on first sight, otherwise only
    /// moves `date_last_used`. Committed before returning.
    async fn record_activity(&self, user_id: i64, now: DateTime<Utc>) -> Result<UsageRecord, sqlx::Error>;

    async fn find(&self, user_id: i64) -> Result<Option<UsageRecord>, sqlx::Error>;
}

pub struct PgUsageStore {
    pool: PgPool,
}

impl PgUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn record_activity(&self, user_id: i64, now: DateTime<Utc>) -> Result<UsageRecord, sqlx::Error> {
        let record = sqlx::query_as::<_, UsageRecord>(
            r#"
            INSERT INTO users (id, date_started, date_last_used)
            VALUES ($1, $2, $2)
            ON CONFLICT (id) DO UPDATE SET date_last_used = EXCLUDED.date_last_used
            RETURNING id, date_started, date_last_used
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id, last_used = %record.date_last_used, "📒 Recorded user activity");
        Ok(record)
    }

    async fn find(&self, user_id: i64) -> Result<Option<UsageRecord>, sqlx::Error> {
        sqlx::query_as::<_, UsageRecord>(
            "SELECT id, date_started, date_last_used FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-process stand-in for the `users` table.
    #[derive(Default)]
    pub struct MemoryUsageStore {
        records: RwLock<HashMap<i64, UsageRecord>>,
    }

    #[async_trait]
    impl UsageStore for MemoryUsageStore {
        async fn record_activity(&self, user_id: i64, now: DateTime<Utc>) -> Result<UsageRecord, sqlx::Error> {
            let mut records = self.records.write().await;
            let record = records
                .entry(user_id)
                .and_modify(|record| record.touch(now))
                .or_insert_with(|| UsageRecord::first_seen(user_id, now));
            Ok(record.clone())
        }

        async fn find(&self, user_id: i64) -> Result<Option<UsageRecord>, sqlx::Error> {
            Ok(self.records.read().await.get(&user_id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryUsageStore;
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_first_activity_sets_both_timestamps() {
        let store = MemoryUsageStore::default();
        let now = Utc::now();

        let record = store.record_activity(7, now).await.unwrap();
        assert_eq!(record.date_started, record.date_last_used);
        assert_eq!(record.date_started, now);
    }

    #[tokio::test]
    async fn test_second_activity_moves_only_last_used() {
        let store = MemoryUsageStore::default();
        let first = Utc::now();
        let later = first + Duration::minutes(5);

        store.record_activity(7, first).await.unwrap();
        let record = store.record_activity(7, later).await.unwrap();

        assert_eq!(record.date_started, first);
        assert_eq!(record.date_last_used, later);
        assert_eq!(store.find(7).await.unwrap(), Some(record));
        assert_eq!(store.find(8).await.unwrap(), None);
    }
}
