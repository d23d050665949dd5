use crate::error::CredentialError;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Issues fresh access tokens, e.g. by exchanging a refresh token.
pub trait TokenSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<String, CredentialError>> + Send + '_>>;
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Reuses an access token until its expiry window passes.
///
/// The cache is an ordinary value owned by whoever needs tokens. Concurrent
/// callers share one refresh: the lock is held while a new token is fetched.
pub struct AccessTokenCache<S> {
    source: S,
    ttl: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl<S: TokenSource> AccessTokenCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the cached token while unexpired, otherwise fetches one.
    pub async fn get(&self) -> Result<String, CredentialError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref()
            && Instant::now() < entry.expires_at
        {
            return Ok(entry.token.clone());
        }

        tracing::debug!(source = self.source.name(), "Refreshing access token");
        let token = self.source.fetch().await?;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        Ok(token)
    }

    /// Time left before the cached token expires, if one is cached.
    pub async fn remaining(&self) -> Option<Duration> {
        let cached = self.cached.lock().await;
        let expires_at = cached.as_ref()?.expires_at;
        expires_at.checked_duration_since(Instant::now())
    }

    /// Drops the cached token so the next `get` refreshes.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
