//! Process-wide chat overlay handles.
//!
//! The overlay has to survive "remounts" of whatever hosts it: acquiring the
//! same id twice returns the same handle, and handles are never torn down
//! for the process lifetime. Handles live in a registry keyed by a fixed id
//! rather than in ad hoc globals.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::store::{KvStore, CHAT_OPEN_KEY};

use super::ChatSession;

/// Registry id of the default overlay.
pub const OVERLAY_ID: &str = "agent-chat-root";

static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<ChatOverlay>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<String, Arc<ChatOverlay>>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A persistent chat surface: the running session plus the open/minimized
/// flag the user last chose.
pub struct ChatOverlay {
    session: tokio::sync::Mutex<ChatSession>,
    store: KvStore,
}

impl ChatOverlay {
    /// Idempotent acquire: creates the overlay on first use of `id`, returns
    /// the existing handle afterwards. `client` and `store` are only
    /// consulted on creation.
    pub fn acquire(id: &str, client: ApiClient, store: KvStore) -> Arc<ChatOverlay> {
        let mut overlays = registry().lock().expect("overlay registry poisoned");
        Arc::clone(overlays.entry(id.to_owned()).or_insert_with(|| {
            Arc::new(ChatOverlay {
                session: tokio::sync::Mutex::new(ChatSession::new(client)),
                store,
            })
        }))
    }

    pub fn session(&self) -> &tokio::sync::Mutex<ChatSession> {
        &self.session
    }

    /// Whether the overlay is expanded. Defaults to open when the flag has
    /// never been written.
    pub fn is_open(&self) -> bool {
        match self.store.get(CHAT_OPEN_KEY) {
            None => true,
            Some(value) => value == "1",
        }
    }

    pub fn set_open(&self, open: bool) -> Result<(), ClientError> {
        self.store.set(CHAT_OPEN_KEY, if open { "1" } else { "0" })
    }
}
