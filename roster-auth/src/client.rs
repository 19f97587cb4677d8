//! Identity endpoint client
//!
//! Bridges the remote identity endpoint and the session store. Login and
//! registration are the only network operations in the subsystem; logout is
//! purely local.

use crate::session::{Session, SessionStore, User};
use roster_core::RosterError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication request errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Identity endpoint rejected the request with status {status}")]
    RequestFailed { status: reqwest::StatusCode },

    #[error("Transport error talking to identity endpoint")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response from identity endpoint")]
    MalformedResponse(#[source] reqwest::Error),

    #[error("Login response superseded by a newer session change")]
    LoginSuperseded,

    #[error("Session could not be persisted")]
    Storage(#[from] RosterError),
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    #[serde(rename = "fullName")]
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Client for the identity endpoint, bound to a session store
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl AuthClient {
    /// Create a client against the given base URL. No request timeout is
    /// imposed; the caller stopping to await is the only cancellation.
    pub fn new(base_url: impl Into<String>, store: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Authenticate against the identity endpoint and establish a session.
    ///
    /// On success the store is updated atomically and the new session
    /// returned. On any failure the store is left untouched. A response
    /// that lands after an intervening logout (or newer login) is
    /// discarded rather than applied.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        debug!("Login attempt for {}", email);
        let seen = self.store.generation();

        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Login rejected with status {}", status);
            return Err(AuthError::RequestFailed { status });
        }

        let payload: LoginResponse = response
            .json()
            .await
            .map_err(AuthError::MalformedResponse)?;

        match self
            .store
            .set_session_if_current(payload.user, payload.token, seen)?
        {
            Some(session) => {
                info!("Login succeeded for {}", email);
                Ok(session)
            }
            None => {
                warn!("Login response for {} arrived after a session change, discarded", email);
                Err(AuthError::LoginSuperseded)
            }
        }
    }

    /// Register a new account. The raw response payload is handed back to
    /// the caller; no session is established as a side effect.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<serde_json::Value, AuthError> {
        debug!("Registration attempt for {}", email);

        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&RegisterRequest {
                full_name,
                email,
                password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Registration rejected with status {}", status);
            return Err(AuthError::RequestFailed { status });
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(AuthError::MalformedResponse)?;

        info!("Registration succeeded for {}", email);
        Ok(payload)
    }

    /// Purely local logout: clears the session and the persisted
    /// credentials. No network call, cannot fail.
    pub fn logout(&self) {
        info!("Logging out");
        self.store.clear();
    }

    /// The session store this client mutates
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }
}
