//! In-memory `SessionStore` for tests and local dev. No external
//! dependency, TTL enforced on read.

use crate::key_for;
use async_trait::async_trait;
use booking_core::{CoreError, CoreResult, Domain, SessionState};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Entry {
    state: SessionState,
    expires_at: Instant,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl booking_core::SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str, domain: Domain) -> CoreResult<Option<SessionState>> {
        let key = key_for(domain, user_id);
        let mut entries = self.entries.write();
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.state.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, user_id: &str, domain: Domain, state: &SessionState, ttl_seconds: u64) -> CoreResult<()> {
        let key = key_for(domain, user_id);
        self.entries.write().insert(
            key,
            Entry {
                state: state.clone(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn clear(&self, user_id: &str, domain: Domain) -> CoreResult<()> {
        let key = key_for(domain, user_id);
        self.entries.write().remove(&key);
        Ok(())
    }
}

// Satisfies the trait bound even though `InMemorySessionStore` never
// actually fails; kept for symmetry with `RedisSessionStore`'s error path.
impl From<crate::error::PersistenceError> for CoreError {
    fn from(err: crate::error::PersistenceError) -> Self {
        CoreError::SessionStoreUnavailable(err.to_string())
    }
}
