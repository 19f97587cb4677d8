//! Session state and the session store
//!
//! The store is the single source of truth for the authenticated identity.
//! It is constructed once per process, initialized from credential storage,
//! and handed to consumers explicitly; nothing reads an ambient global.

use crate::permissions::Permission;
use crate::storage::CredentialStorage;
use roster_core::RosterResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// User email
    #[serde(default)]
    pub email: Option<String>,
    /// Role identifiers assigned to the user
    #[serde(default)]
    pub roles: HashSet<String>,
    /// Granted permissions
    #[serde(default)]
    pub permissions: HashSet<Permission>,
}

impl User {
    /// Check if the user has a specific permission.
    /// Admin is a wildcard and satisfies every check.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::Admin) || self.permissions.contains(&permission)
    }

    /// Check if the user carries a specific role. Roles have no wildcard.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Current authentication state.
///
/// A session is either anonymous or fully authenticated; a user without a
/// token (or the reverse) is not representable.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { user: User, token: String },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user, .. } => Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { token, .. } => Some(token.as_str()),
        }
    }

    /// Permission check against this snapshot; anonymous always denies.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.user().is_some_and(|u| u.has_permission(permission))
    }

    /// Role check against this snapshot; anonymous always denies.
    pub fn has_role(&self, role: &str) -> bool {
        self.user().is_some_and(|u| u.has_role(role))
    }
}

struct StoreInner {
    session: Session,
    /// Bumped on every mutation; used to fence late login responses.
    generation: u64,
}

/// Single source of truth for the current session, with write-through
/// persistence to credential storage.
pub struct SessionStore {
    storage: CredentialStorage,
    inner: RwLock<StoreInner>,
}

impl SessionStore {
    /// Create a store over the given credential storage. The session starts
    /// anonymous until `initialize` rehydrates it.
    pub fn new(storage: CredentialStorage) -> Self {
        Self {
            storage,
            inner: RwLock::new(StoreInner {
                session: Session::Anonymous,
                generation: 0,
            }),
        }
    }

    /// Rehydrate the session from credential storage.
    ///
    /// Both entries present and parsable yields an authenticated session.
    /// Neither present yields anonymous. A lone entry or an unparsable user
    /// record is corrupted state: both entries are wiped and the session
    /// stays anonymous. Never fails open, never errors to the caller.
    pub fn initialize(&self) {
        let token = self.storage.read_token();
        let user = match self.storage.read_user() {
            Ok(user) => user,
            Err(e) => {
                warn!("Stored user record is corrupt, discarding session: {}", e);
                self.storage.wipe();
                self.replace(Session::Anonymous);
                return;
            }
        };

        match (user, token) {
            (Some(user), Some(token)) => {
                info!("Rehydrated session for user '{}'", user.name);
                self.replace(Session::Authenticated { user, token });
            }
            (None, None) => {
                debug!("No stored session found");
                self.replace(Session::Anonymous);
            }
            _ => {
                warn!("Stored session is missing one of its entries, discarding");
                self.storage.wipe();
                self.replace(Session::Anonymous);
            }
        }
    }

    fn replace(&self, session: Session) {
        let mut inner = self.inner.write().unwrap();
        inner.session = session;
        inner.generation += 1;
    }

    /// Generation snapshot for fencing a later `set_session_if_current`.
    pub fn generation(&self) -> u64 {
        self.inner.read().unwrap().generation
    }

    /// Atomically replace the session and persist both credential entries.
    pub fn set_session(&self, user: User, token: String) -> RosterResult<Session> {
        let mut inner = self.inner.write().unwrap();
        Self::commit(&self.storage, &mut inner, user, token)
    }

    /// Like `set_session`, but only if no other mutation happened since the
    /// given generation was observed. Returns `None` when the update was
    /// superseded and therefore discarded.
    pub fn set_session_if_current(
        &self,
        user: User,
        token: String,
        seen: u64,
    ) -> RosterResult<Option<Session>> {
        let mut inner = self.inner.write().unwrap();
        if inner.generation != seen {
            debug!(
                "Discarding session update issued at generation {} (now {})",
                seen, inner.generation
            );
            return Ok(None);
        }
        Self::commit(&self.storage, &mut inner, user, token).map(Some)
    }

    fn commit(
        storage: &CredentialStorage,
        inner: &mut StoreInner,
        user: User,
        token: String,
    ) -> RosterResult<Session> {
        storage.write(&user, &token)?;
        inner.session = Session::Authenticated { user, token };
        inner.generation += 1;
        Ok(inner.session.clone())
    }

    /// Reset to anonymous and remove both credential entries. Cannot fail.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.session = Session::Anonymous;
        inner.generation += 1;
        self.storage.wipe();
        debug!("Session cleared");
    }

    /// Clone of the current session state
    pub fn snapshot(&self) -> Session {
        self.inner.read().unwrap().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().unwrap().session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.read().unwrap().session.user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap()
            .session
            .token()
            .map(|t| t.to_string())
    }

    /// Permission check against the current session
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.inner.read().unwrap().session.has_permission(permission)
    }

    /// Role check against the current session
    pub fn has_role(&self, role: &str) -> bool {
        self.inner.read().unwrap().session.has_role(role)
    }
}
