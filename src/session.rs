//! Identity and session state.
//!
//! The session becomes known only after it has been hydrated from storage.
//! Until then it is [`SessionState::Unhydrated`], which authorization code
//! must treat differently from [`SessionState::SignedOut`].

use crate::error::KvError;
use crate::kv::KeyValueStore;
use crate::store::{Store, Subscription};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

const DEFAULT_SESSION_KEY: &str = "session";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Storage has not been read yet.
    #[default]
    Unhydrated,
    SignedOut,
    SignedIn { user_id: u64 },
}

impl SessionState {
    /// Whether storage has been read or the session was set explicitly.
    #[must_use]
    pub const fn is_hydrated(self) -> bool {
        !matches!(self, Self::Unhydrated)
    }

    /// Signed-in user, if any.
    #[must_use]
    pub const fn user_id(self) -> Option<u64> {
        match self {
            Self::SignedIn { user_id } => Some(user_id),
            Self::Unhydrated | Self::SignedOut => None,
        }
    }

    /// Authorization answer for this state.
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Unhydrated => Access::Pending,
            Self::SignedOut => Access::Denied,
            Self::SignedIn { user_id } => Access::Granted(user_id),
        }
    }
}

/// Authorization answer derived from a [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Not decided yet; wait for hydration.
    Pending,
    Denied,
    Granted(u64),
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    user_id: u64,
}

/// Observable session holder.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Store<SessionState>,
    key: Cow<'static, str>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// An unhydrated session persisted under the `session` key.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(DEFAULT_SESSION_KEY)
    }

    /// Use a custom storage key for the persisted session.
    #[must_use]
    pub fn with_key(key: impl Into<Cow<'static, str>>) -> Self {
        Self {
            state: Store::new(SessionState::Unhydrated),
            key: key.into(),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Authorization answer for the current state.
    pub fn access(&self) -> Access {
        self.state().access()
    }

    /// Register a listener called after every session change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// Load the persisted session.
    ///
    /// Storage only decides an unhydrated session. If a sign-in or sign-out
    /// settled the session while the read was pending, that state is kept
    /// and returned.
    ///
    /// # Errors
    /// Propagates storage failures; the session then stays as it was, so an
    /// unhydrated session remains unhydrated.
    pub async fn hydrate<K: KeyValueStore>(&self, kv: &K) -> Result<SessionState, KvError> {
        let persisted = kv.get_json::<PersistedSession>(&self.key).await?;
        let next = match persisted {
            Some(PersistedSession { user_id }) => SessionState::SignedIn { user_id },
            None => SessionState::SignedOut,
        };
        let mut current = next;
        let applied = self.state.update_if(|state| {
            if state.is_hydrated() {
                current = *state;
                return false;
            }
            *state = next;
            true
        });
        if applied {
            debug!(key = %self.key, signed_in = next.user_id().is_some(), "session hydrated");
        } else {
            debug!(key = %self.key, "session already settled, stored value ignored");
        }
        Ok(current)
    }

    /// Persist and switch to a signed-in session.
    ///
    /// # Errors
    /// Propagates storage failures without changing the session.
    pub async fn sign_in<K: KeyValueStore>(&self, kv: &K, user_id: u64) -> Result<(), KvError> {
        kv.set_json(&self.key, &PersistedSession { user_id }).await?;
        self.state.set(SessionState::SignedIn { user_id });
        debug!(user_id, "signed in");
        Ok(())
    }

    /// Forget the persisted session and switch to signed out.
    ///
    /// # Errors
    /// Propagates storage failures without changing the session.
    pub async fn sign_out<K: KeyValueStore>(&self, kv: &K) -> Result<(), KvError> {
        kv.remove(&self.key).await?;
        self.state.set(SessionState::SignedOut);
        debug!("signed out");
        Ok(())
    }
}
