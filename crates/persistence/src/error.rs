//! Internal persistence errors, converted to `CoreError::SessionStoreUnavailable`
//! at the trait boundary so a session store outage degrades to operating
//! stateless for the turn rather than failing it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session store operation timed out")]
    Timeout,
}
