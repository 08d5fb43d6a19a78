//! Profile generation with a write-through local cache.
//!
//! Generation is expensive (the backend runs the latest CV through an LLM),
//! so the last result is cached and rehydrated before any network call.
//! Invalidation is explicit only ("Regenerate"); there is no TTL.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::profile::Profile;
use crate::store::{KvStore, PROFILE_KEY};

/// `get`/`set`/`invalidate` over the cached profile JSON. The value is kept
/// exactly as received so fields this client does not model survive a round
/// trip.
#[derive(Debug, Clone)]
pub struct ProfileCache {
    store: KvStore,
}

impl ProfileCache {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// The cached profile, if present and still parseable. A corrupt entry
    /// counts as a miss.
    pub fn get(&self) -> Option<Profile> {
        let raw = self.store.get(PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "ignoring corrupt cached profile");
                None
            }
        }
    }

    /// The cached JSON exactly as stored.
    pub fn get_raw(&self) -> Option<String> {
        self.store.get(PROFILE_KEY)
    }

    pub fn set_raw(&self, profile_json: &str) -> Result<(), ClientError> {
        self.store.set(PROFILE_KEY, profile_json)
    }

    pub fn invalidate(&self) -> Result<(), ClientError> {
        self.store.remove(PROFILE_KEY)
    }
}

pub struct ProfileService {
    client: ApiClient,
    cache: ProfileCache,
}

impl ProfileService {
    pub fn new(client: ApiClient, cache: ProfileCache) -> Self {
        Self { client, cache }
    }

    pub fn cached(&self) -> Option<Profile> {
        self.cache.get()
    }

    /// Stale-while-revalidate entry point: the cached value wins outright,
    /// only a miss triggers generation.
    pub async fn get_or_generate(&self) -> Result<Profile, ClientError> {
        if let Some(profile) = self.cache.get() {
            debug!("serving cached profile");
            return Ok(profile);
        }
        self.generate().await
    }

    /// Forces a fresh generation and replaces the cache wholesale.
    pub async fn generate(&self) -> Result<Profile, ClientError> {
        let body = self.client.generate_profile().await?;
        let raw = body
            .get("profile")
            .filter(|p| !p.is_null())
            .ok_or_else(|| ClientError::Shape("no profile in response".into()))?;
        let profile: Profile = serde_json::from_value(raw.clone())?;
        self.cache.set_raw(&raw.to_string())?;
        Ok(profile)
    }

    pub fn invalidate(&self) -> Result<(), ClientError> {
        self.cache.invalidate()
    }
}
