// src/models/usage.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    pub id: i64,
    pub date_started: DateTime<Utc>,
    pub date_last_used: DateTime<Utc>,
}

impl UsageRecord {
    pub fn first_seen(id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            date_started: now,
            date_last_used: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.date_last_used = now;
    }
}
