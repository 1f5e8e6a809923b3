//! Per-`(user_id, domain)` serialization: the session state is a
//! single-writer resource per conversation, so an application-level
//! mutex keyed by (user_id, domain) guards the span get→...→set.
//! A `DashMap` of `tokio::sync::Mutex` gives us that without a single
//! process-wide lock.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct ConversationLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        ConversationLocks::default()
    }

    /// Acquire the mutex for `key`, creating it on first use. The returned
    /// guard holds the lock for as long as it lives; the entry itself is
    /// never removed, trading a little long-run memory for never racing a
    /// remove against a fresh `entry().or_insert()`.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc as StdArc;

    #[tokio::test]
    async fn same_key_serializes_concurrent_turns() {
        let locks = StdArc::new(ConversationLocks::new());
        let counter = StdArc::new(AtomicU32::new(0));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("svc:u1").await;
                let before = counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                assert_eq!(counter.load(Ordering::SeqCst), before + 1);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let locks = ConversationLocks::new();
        let _g1 = locks.acquire("svc:u1").await;
        let g2 = tokio::time::timeout(std::time::Duration::from_millis(50), locks.acquire("svc:u2")).await;
        assert!(g2.is_ok());
    }
}
