//! Redis-backed `SessionStore` for production. Values are
//! JSON with ISO-string leaves — `SessionState`'s own `Serialize` impl
//! already produces that shape, so this layer only owns the key format and
//! the TTL.

use crate::error::PersistenceError;
use crate::key_for;
use async_trait::async_trait;
use booking_core::{CoreError, CoreResult, Domain, SessionState};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str) -> Result<Self, PersistenceError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(RedisSessionStore { conn })
    }

    async fn get_inner(&self, user_id: &str, domain: Domain) -> Result<Option<SessionState>, PersistenceError> {
        let key = key_for(domain, user_id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set_inner(
        &self,
        user_id: &str,
        domain: Domain,
        state: &SessionState,
        ttl_seconds: u64,
    ) -> Result<(), PersistenceError> {
        let key = key_for(domain, user_id);
        let json = serde_json::to_string(state)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, json, ttl_seconds.max(1)).await?;
        Ok(())
    }

    async fn clear_inner(&self, user_id: &str, domain: Domain) -> Result<(), PersistenceError> {
        let key = key_for(domain, user_id);
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&key).await?;
        Ok(())
    }
}

#[async_trait]
impl booking_core::SessionStore for RedisSessionStore {
    async fn get(&self, user_id: &str, domain: Domain) -> CoreResult<Option<SessionState>> {
        self.get_inner(user_id, domain).await.map_err(|err| {
            tracing::error!(error = %err, user_id, %domain, "session store get failed");
            CoreError::from(err)
        })
    }

    async fn set(&self, user_id: &str, domain: Domain, state: &SessionState, ttl_seconds: u64) -> CoreResult<()> {
        self.set_inner(user_id, domain, state, ttl_seconds).await.map_err(|err| {
            tracing::error!(error = %err, user_id, %domain, "session store set failed");
            CoreError::from(err)
        })
    }

    async fn clear(&self, user_id: &str, domain: Domain) -> CoreResult<()> {
        self.clear_inner(user_id, domain).await.map_err(|err| {
            tracing::error!(error = %err, user_id, %domain, "session store clear failed");
            CoreError::from(err)
        })
    }
}
