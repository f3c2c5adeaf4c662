//! # Session Manager
//!
//! Owns the staff bearer token for the whole process.
//!
//! The token lives in memory and is mirrored to a [`CredentialStore`] under
//! [`TOKEN_KEY`]. Persistence is best-effort in both directions: a store
//! failure is logged and swallowed, because the in-memory token remains
//! usable for the rest of the process lifetime. Only this type writes the
//! token; gateways read it through [`SessionManager::current_token`].
//!
//! Restore, set and clear are serialized on an async mutex held across the
//! store call, so the persisted token always matches the last in-memory
//! write. The `parking_lot` slot itself is never held across an await.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use zeroize::Zeroizing;

use crate::store::CredentialStore;

/// Key under which the token is persisted.
pub const TOKEN_KEY: &str = "auth_token";

/// An opaque bearer credential.
///
/// The backing string is zeroed on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// The raw token, for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Process-wide owner of the bearer token.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    token: RwLock<Option<BearerToken>>,
    persist: AsyncMutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store.store_name())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionManager {
    /// Create an unauthenticated session over `store`. Call
    /// [`SessionManager::restore`] once at startup to pick up a saved token.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            token: RwLock::new(None),
            persist: AsyncMutex::new(()),
        }
    }

    /// Best-effort load of a persisted token.
    ///
    /// Returns whether a token was restored. Never fails: a missing key or
    /// an unavailable store leaves the session unauthenticated. A token
    /// already set in memory (e.g. by a login that finished first) is not
    /// overwritten.
    pub async fn restore(&self) -> bool {
        let _persist = self.persist.lock().await;
        let saved = match self.store.get(TOKEN_KEY).await {
            Ok(Some(token)) if !token.trim().is_empty() => BearerToken::new(token),
            Ok(_) => {
                tracing::debug!(store = self.store.store_name(), "no saved session");
                return false;
            }
            Err(e) => {
                tracing::warn!(store = self.store.store_name(), "failed to load saved session: {e}");
                return false;
            }
        };

        let mut slot = self.token.write();
        if slot.is_some() {
            return false;
        }
        *slot = Some(saved);
        tracing::debug!(store = self.store.store_name(), "restored saved session");
        true
    }

    /// Set the in-memory token and try to persist it.
    ///
    /// Completes only after the persistence attempt has finished, so a
    /// caller that awaits this can rely on the token having been handed to
    /// the store.
    pub async fn set_token(&self, token: BearerToken) {
        let raw = Zeroizing::new(token.as_str().to_string());
        let _persist = self.persist.lock().await;
        *self.token.write() = Some(token);
        if let Err(e) = self.store.set(TOKEN_KEY, &raw).await {
            tracing::warn!(
                store = self.store.store_name(),
                "failed to persist session token; it will not survive a restart: {e}"
            );
        }
    }

    /// Clear the in-memory and persisted token.
    pub async fn clear_token(&self) {
        let _persist = self.persist.lock().await;
        *self.token.write() = None;
        if let Err(e) = self.store.remove(TOKEN_KEY).await {
            tracing::warn!(store = self.store.store_name(), "failed to remove saved session: {e}");
        }
    }

    /// The current token, or `None` when unauthenticated.
    pub fn current_token(&self) -> Option<BearerToken> {
        self.token.read().clone()
    }

    /// Whether a token is held in memory.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }
}
