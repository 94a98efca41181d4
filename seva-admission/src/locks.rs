use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serialization key: one lock per (offering, requested date) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub offering_id: i32,
    pub date: Option<NaiveDate>,
}

/// Registry of per-slot async mutexes. Every read-then-write against the
/// capacity state of a slot (admission capacity check, settlement
/// completion) must run under this lock, so two concurrent requests can
/// never both observe a free slot and both take it.
///
/// Lock entries are created on demand and kept for the process lifetime;
/// the catalog is small and fixed, so the map never grows past it.
#[derive(Default)]
pub struct SlotLocks {
    inner: Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, offering_id: i32, date: Option<NaiveDate>) -> OwnedMutexGuard<()> {
        let key = SlotKey { offering_id, date };
        let slot = {
            let mut map = self.inner.lock().expect("slot lock registry poisoned");
            Arc::clone(map.entry(key).or_default())
        };
        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_serializes_different_keys_do_not() {
        let locks = Arc::new(SlotLocks::new());

        let guard = locks.acquire(1, None).await;

        // A different slot is immediately available.
        let other = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            locks.acquire(2, None),
        )
        .await;
        assert!(other.is_ok());

        // The held slot is not.
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            locks.acquire(1, None),
        )
        .await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            locks.acquire(1, None),
        )
        .await;
        assert!(reacquired.is_ok());
    }
}
