//! Client-side login state.
//!
//! An [`AuthSession`] owns two copies of the same facts: the in-memory
//! [`SessionState`] that readers see, and the persisted `accessToken`,
//! `refreshToken` and `userData` entries that let the state survive a
//! restart. Every transition writes storage first, as one batch, and only
//! then publishes the new state, so the two never disagree.

use std::sync::Arc;

use latch_common::views::{AuthGrant, User};
use tokio::sync::{Mutex, watch};
use tracing::{error, info, instrument, warn};

use crate::{
    api::{ApiClientError, AuthApi},
    error::SessionError,
    storage::{
        ACCESS_TOKEN_KEY, KeyValueStore, Mutation, REFRESH_TOKEN_KEY, SESSION_KEYS, StorageError,
        USER_DATA_KEY,
    },
};


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub current_user: Option<User>,
}

pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStore>,

    // held across the network call and the commit of login/register/logout
    op_lock: Mutex<()>,

    state: watch::Sender<SessionState>,
}

impl AuthSession {
    /// Restore the session from `storage`.
    ///
    /// A `userData` entry that cannot be parsed, or a backend whose contents
    /// cannot be parsed at all, is treated as no session: the persisted
    /// entries are cleared and the session starts logged out.
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, SessionError> {
        let state = restore(storage.as_ref())?;
        info!(
            is_authenticated = state.is_authenticated,
            "Session restored from storage"
        );

        Ok(Self {
            api,
            storage,
            op_lock: Mutex::new(()),
            state: watch::Sender::new(state),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    /// A copy of the whole state, read under one lock.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch the session. The receiver sees every transition, including the
    /// reset on logout.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _guard = self.op_lock.lock().await;

        match self.api.login(email, password).await {
            Ok(grant) => self.commit(grant),
            Err(err) => {
                let message = failure_message(&err, "Login failed");
                warn!(error = %err, "Login rejected");
                self.reset_after_failure();
                Err(SessionError::Login { message })
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _guard = self.op_lock.lock().await;

        match self.api.register(email, password).await {
            Ok(grant) => self.commit(grant),
            Err(err) => {
                let message = failure_message(&err, "Registration failed");
                warn!(error = %err, "Registration rejected");
                self.reset_after_failure();
                Err(SessionError::Registration { message })
            }
        }
    }

    /// Forget the session locally. No request is made to the server.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _guard = self.op_lock.lock().await;
        self.reset()?;
        info!("Logged out");
        Ok(())
    }

    fn commit(&self, grant: AuthGrant) -> Result<User, SessionError> {
        if !grant.has_tokens() {
            return Err(SessionError::MissingTokens);
        }

        let AuthGrant {
            access_token,
            refresh_token,
            user,
        } = grant;
        let user_data = serde_json::to_string(&user).map_err(StorageError::from)?;

        self.storage.apply(&[
            Mutation::set(REFRESH_TOKEN_KEY, refresh_token.unwrap_or_default()),
            Mutation::set(ACCESS_TOKEN_KEY, access_token.unwrap_or_default()),
            Mutation::set(USER_DATA_KEY, user_data),
        ])?;

        self.state.send_replace(SessionState {
            is_authenticated: true,
            current_user: Some(user.clone()),
        });
        info!(user_id = %user.id, email = %user.email, "Session started");

        Ok(user)
    }

    fn reset(&self) -> Result<(), SessionError> {
        self.storage.apply(&clear_batch())?;
        self.state.send_replace(SessionState::default());
        Ok(())
    }

    fn reset_after_failure(&self) {
        if let Err(e) = self.reset() {
            error!(error = %e, "Failed to clear session after a rejected request");
        }
    }
}

fn restore(storage: &dyn KeyValueStore) -> Result<SessionState, SessionError> {
    match read_persisted(storage) {
        Err(SessionError::Storage(StorageError::Json(e))) => {
            warn!(error = %e, "Session storage is unreadable, starting logged out");
            storage.clear()?;
            Ok(SessionState::default())
        }
        other => other,
    }
}

fn read_persisted(storage: &dyn KeyValueStore) -> Result<SessionState, SessionError> {
    let is_authenticated = storage.get(ACCESS_TOKEN_KEY)?.is_some();

    let current_user = match storage.get(USER_DATA_KEY)? {
        None => None,
        Some(raw) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user data is unreadable, discarding session");
                storage.apply(&clear_batch())?;
                return Ok(SessionState::default());
            }
        },
    };

    Ok(SessionState {
        is_authenticated,
        current_user,
    })
}

fn clear_batch() -> Vec<Mutation> {
    SESSION_KEYS.iter().map(|key| Mutation::remove(key)).collect()
}

fn failure_message(err: &ApiClientError, fallback: &str) -> String {
    err.message().unwrap_or_else(|| fallback.to_string())
}
