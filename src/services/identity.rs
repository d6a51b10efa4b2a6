use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::CacheSettings;
use crate::models::UserId;

/// Errors that can occur while resolving a session token
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Unauthorized: unknown or expired token")]
    Unauthorized,

    #[error("Malformed session value for token: {0}")]
    Malformed(String),
}

/// Maps a session token to the user it was issued for
///
/// Tokens are issued by the login flow elsewhere; this side only reads them.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<UserId, IdentityError>;
}

/// Key under which the login flow stores a token's user id
pub fn session_key(prefix: &str, token: &str) -> String {
    format!("{}{}", prefix, token)
}

/// Two-tier token lookup
///
/// L1 is an in-process moka cache with a short TTL, L2 is the shared redis
/// session store. Only hits are cached, so a revoked token stops resolving
/// once its L1 entry expires.
pub struct CachedIdentityResolver {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, UserId>,
    key_prefix: String,
}

impl CachedIdentityResolver {
    /// Connect to redis and build the L1 cache
    pub async fn new(
        redis_url: &str,
        l1_size: u64,
        ttl_secs: u64,
        key_prefix: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            key_prefix: key_prefix.into(),
        })
    }

    pub async fn from_settings(settings: &CacheSettings) -> Result<Self, IdentityError> {
        Self::new(
            &settings.redis_url,
            settings.l1_cache_size.unwrap_or(1000),
            settings.ttl_secs.unwrap_or(60),
            settings.key_prefix.clone().unwrap_or_default(),
        )
        .await
    }

    /// Drop a token from L1, e.g. after logout
    pub async fn forget(&self, token: &str) {
        self.l1_cache.invalidate(token).await;
    }

    /// Number of tokens currently held in L1
    pub fn l1_entries(&self) -> u64 {
        self.l1_cache.entry_count()
    }
}

#[async_trait]
impl IdentityResolver for CachedIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<UserId, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::Unauthorized);
        }

        if let Some(user_id) = self.l1_cache.get(token).await {
            tracing::trace!("L1 session hit");
            return Ok(user_id);
        }

        let key = session_key(&self.key_prefix, token);
        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        let Some(raw) = value else {
            tracing::debug!("Session token not found");
            return Err(IdentityError::Unauthorized);
        };

        let user_id = parse_user_id(&raw).ok_or_else(|| IdentityError::Malformed(raw.clone()))?;
        self.l1_cache.insert(token.to_string(), user_id).await;

        Ok(user_id)
    }
}

fn parse_user_id(raw: &str) -> Option<UserId> {
    raw.trim().parse::<UserId>().ok().filter(|id| *id > 0)
}
