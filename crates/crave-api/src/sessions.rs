//! Server-side session records.
//!
//! [`SessionCache`] keeps records in process memory like
//! `tower_sessions::MemoryStore`, but an expired record is removed on
//! the next lookup and [`sweep_sessions`] clears the rest on a timer, so
//! abandoned sessions do not accumulate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::ExpiredDeletion;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

/// How often the server clears expired sessions.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// In-memory session store that forgets expired records.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

fn is_expired(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date <= now
}

impl SessionCache {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record whose expiry has passed. Returns how many went.
    pub async fn sweep_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !is_expired(record, now));
        before.saturating_sub(records.len())
    }

    /// Number of records held, live or not yet swept.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether no records are held.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut records = self.records.lock().await;
        let expired = match records.get(session_id) {
            None => return Ok(None),
            Some(record) => is_expired(record, OffsetDateTime::now_utc()),
        };
        if expired {
            records.remove(session_id);
            return Ok(None);
        }
        Ok(records.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SessionCache {
    async fn delete_expired(&self) -> session_store::Result<()> {
        self.sweep_expired().await;
        Ok(())
    }
}

/// Clear expired sessions every `every` until the task is aborted.
pub async fn sweep_sessions(cache: SessionCache, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let removed = cache.sweep_expired().await;
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions cleared");
        }
    }
}
