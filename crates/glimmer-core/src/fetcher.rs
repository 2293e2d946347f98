//! Cache-first, fetch-on-miss, write-through data acquisition.
//!
//! Each segment caches two entries with the same TTL:
//! - an *index* entry, keyed by the segment's scope (e.g. repository path),
//!   whose value is an identifier derived during the fetch (e.g. project id);
//! - a *payload* entry, keyed by that identifier, holding the raw response.
//!
//! A hit needs both. The identifier is often the expensive part to derive, and
//! the two entries may be rotated or evicted independently.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::cache::CacheStore;
use crate::error::SegmentError;
use crate::ttl::Ttl;

/// Cache key layout for one segment invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    index: String,
    payload_prefix: String,
}

impl CacheKeys {
    /// `index_prefix` and `scope` form the index key; `payload_prefix` and the
    /// fetched identifier form the payload key.
    pub fn new(index_prefix: &str, scope: &str, payload_prefix: &str) -> Self {
        Self {
            index: format!("{}_{}", index_prefix, scope),
            payload_prefix: payload_prefix.to_string(),
        }
    }

    pub fn index_key(&self) -> &str {
        &self.index
    }

    pub fn payload_key(&self, ident: &str) -> String {
        format!("{}_{}", self.payload_prefix, ident)
    }
}

/// What a fetch function hands back on success.
#[derive(Debug, Clone)]
pub struct Fresh {
    /// Identifier stored under the index key.
    pub ident: String,
    /// Raw response body stored under the payload key.
    pub body: String,
}

/// A parsed payload and where it came from.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub payload: T,
    pub ident: String,
    pub from_cache: bool,
}

/// Runs fetches through a [`CacheStore`].
pub struct CachedFetcher<'a> {
    store: &'a dyn CacheStore,
}

impl<'a> CachedFetcher<'a> {
    pub fn new(store: &'a dyn CacheStore) -> Self {
        Self { store }
    }

    /// Returns the cached payload when both entries are present, otherwise calls
    /// `fetch`, parses its body and writes both entries back.
    ///
    /// A cached payload that fails to parse is a terminal
    /// [`SegmentError::MalformedResponse`], not a miss. Errors from `fetch` are
    /// returned unchanged and leave the cache untouched.
    pub async fn fetch_with_cache<T, F, Fut>(
        &self,
        keys: &CacheKeys,
        ttl: Ttl,
        fetch: F,
    ) -> Result<Fetched<T>, SegmentError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Fresh, SegmentError>>,
    {
        let Some(ttl) = ttl.as_duration() else {
            tracing::debug!("Caching disabled for {}", keys.index_key());
            let fresh = fetch().await?;
            let payload = parse(&fresh.body)?;
            return Ok(Fetched {
                payload,
                ident: fresh.ident,
                from_cache: false,
            });
        };

        if let Some(ident) = self.store.get(keys.index_key()) {
            let payload_key = keys.payload_key(&ident);
            match self.store.get(&payload_key) {
                Some(body) => {
                    tracing::debug!("Cache hit for {}", payload_key);
                    let payload = parse(&body).map_err(|e| {
                        SegmentError::MalformedResponse(format!("cached {}: {}", payload_key, e))
                    })?;
                    return Ok(Fetched {
                        payload,
                        ident,
                        from_cache: true,
                    });
                }
                None => tracing::debug!("Cache index hit but {} is missing", payload_key),
            }
        } else {
            tracing::debug!("Cache miss for {}", keys.index_key());
        }

        let fresh = fetch().await?;
        let payload = parse(&fresh.body)?;

        let payload_key = keys.payload_key(&fresh.ident);
        if let Err(e) = self.store.set(&payload_key, &fresh.body, ttl) {
            tracing::warn!("Failed to cache {}: {}", payload_key, e);
        } else if let Err(e) = self.store.set(keys.index_key(), &fresh.ident, ttl) {
            tracing::warn!("Failed to cache {}: {}", keys.index_key(), e);
        }

        Ok(Fetched {
            payload,
            ident: fresh.ident,
            from_cache: false,
        })
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, SegmentError> {
    serde_json::from_str(body).map_err(|e| SegmentError::MalformedResponse(e.to_string()))
}
