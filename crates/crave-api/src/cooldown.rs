//! Per-user click cooldown.
//!
//! The last accepted click is remembered per account rather than per
//! session, so signing out and back in does not reset the wait.

use std::collections::HashMap;

use crave_types::UserId;
use tokio::sync::Mutex;

/// Entries kept before stale ones are pruned.
const PRUNE_THRESHOLD: usize = 4096;

/// Time of each user's last accepted click (Unix millis).
#[derive(Debug, Default)]
pub struct ClickCooldown {
    last_click_ms: Mutex<HashMap<UserId, i64>>,
}

impl ClickCooldown {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click by `user` at `now_ms` if at least `cooldown_ms`
    /// have passed since their last accepted one. Returns whether the
    /// click was accepted; a refused click does not restart the wait.
    pub async fn try_click(&self, user: UserId, now_ms: i64, cooldown_ms: i64) -> bool {
        if cooldown_ms <= 0 {
            return true;
        }
        let mut last_click_ms = self.last_click_ms.lock().await;
        if last_click_ms
            .get(&user)
            .is_some_and(|last| now_ms.saturating_sub(*last) < cooldown_ms)
        {
            return false;
        }
        if last_click_ms.len() >= PRUNE_THRESHOLD {
            last_click_ms.retain(|_, last| now_ms.saturating_sub(*last) < cooldown_ms);
        }
        last_click_ms.insert(user, now_ms);
        true
    }
}
