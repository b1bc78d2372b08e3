//! Client for a remote JWK Set with an in-memory key cache.
//!
//! Keys are fetched lazily: a lookup that misses the cache downloads the
//! whole document once and indexes every key by `kid`. Entries are never
//! evicted; a later download overwrites keys with the same `kid`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::config::JwksConfig;
use crate::errors::{AuthError, FetchError};

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, Jwk>,
    /// Outcome of the most recent download, shared with callers that waited
    /// on it.
    last_failure: Option<FetchError>,
}

/// Client for a remote JWK Set.
///
/// One mutex covers lookups and the download-then-update path, so at most one
/// download runs per client. Callers that queue behind a download reuse its
/// outcome instead of starting another one.
pub struct JwksClient {
    uri: Url,
    http: reqwest::Client,
    fetch_timeout: Duration,
    cache: Mutex<KeyCache>,
    /// Number of finished downloads, successful or not. Advanced while the
    /// cache lock is still held, after the outcome is recorded.
    generation: AtomicU64,
}

impl JwksClient {
    /// Build a client with its own HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfig`] if the URI does not parse or the
    /// HTTP client cannot be created.
    pub fn new(config: &JwksConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthError::InvalidConfig(format!("HTTP client: {e}")))?;
        Self::with_http_client(config, http)
    }

    /// Build a client that shares an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfig`] if the URI does not parse.
    pub fn with_http_client(config: &JwksConfig, http: reqwest::Client) -> Result<Self, AuthError> {
        let uri = Url::parse(&config.uri)
            .map_err(|e| AuthError::InvalidConfig(format!("JWKS uri `{}`: {e}", config.uri)))?;

        Ok(Self {
            uri,
            http,
            fetch_timeout: config.fetch_timeout(),
            cache: Mutex::new(KeyCache::default()),
            generation: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Return the JWK with the given ID, downloading the JWK Set on a miss.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Fetch`] if the download fails
    /// - [`AuthError::KeyNotFound`] if the ID is absent after a download
    pub async fn resolve(&self, kid: &str) -> Result<Jwk, AuthError> {
        let observed = self.generation.load(Ordering::Acquire);
        let mut cache = self.cache.lock().await;

        if let Some(key) = cache.keys.get(kid) {
            return Ok(key.clone());
        }

        // A download finished while this caller waited for the lock.
        if self.generation.load(Ordering::Acquire) != observed {
            return match &cache.last_failure {
                Some(err) => Err(AuthError::Fetch(err.clone())),
                None => Err(AuthError::KeyNotFound {
                    kid: kid.to_owned(),
                }),
            };
        }

        debug!(kid, "JWK cache miss");
        self.fetch_into(&mut cache).await?;

        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound {
                kid: kid.to_owned(),
            })
    }

    /// Same as [`JwksClient::resolve`], aborted when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cancelled`] on cancellation, otherwise the
    /// errors of [`JwksClient::resolve`].
    pub async fn resolve_with_cancellation(
        &self,
        kid: &str,
        cancel: &CancellationToken,
    ) -> Result<Jwk, AuthError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled.into()),
            result = self.resolve(kid) => result,
        }
    }

    /// Download the JWK Set now, regardless of the cache state.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Fetch`] if the download fails.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let mut cache = self.cache.lock().await;
        self.fetch_into(&mut cache).await?;
        Ok(())
    }

    /// Key IDs currently cached, sorted.
    pub async fn cached_key_ids(&self) -> Vec<String> {
        let cache = self.cache.lock().await;
        let mut ids: Vec<String> = cache.keys.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    async fn fetch_into(&self, cache: &mut KeyCache) -> Result<(), FetchError> {
        debug!(jwks_uri = %self.uri, "Fetching JWK set");

        let outcome = match tokio::time::timeout(self.fetch_timeout, self.download()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        };

        let result = match outcome {
            Ok(set) => {
                let key_count = set.keys.len();
                for jwk in set.keys {
                    let kid = jwk.common.key_id.clone().unwrap_or_default();
                    cache.keys.insert(kid, jwk);
                }
                cache.last_failure = None;
                info!(jwks_uri = %self.uri, key_count, "JWK set fetched");
                Ok(())
            }
            Err(err) => {
                debug!(jwks_uri = %self.uri, error = %err, "JWK set fetch failed");
                cache.last_failure = Some(err.clone());
                Err(err)
            }
        };

        // Published only once the outcome is in the cache, so every caller
        // that read the old value while this download ran shares its result.
        self.generation.fetch_add(1, Ordering::AcqRel);
        result
    }

    async fn download(&self) -> Result<JwkSet, FetchError> {
        let response = self
            .http
            .get(self.uri.as_str())
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("application/json") {
            return Err(FetchError::ContentType(content_type.to_owned()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Body(e.to_string()))
    }
}

impl std::fmt::Debug for JwksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksClient")
            .field("uri", &self.uri.as_str())
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}
