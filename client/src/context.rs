//! Ambient access to the running [`AuthSession`].
//!
//! Code deep in a command does not need the session threaded through every
//! call. [`AuthSession::scope`] installs it for the duration of a future and
//! [`auth`] hands it back from anywhere inside that future.

use std::{future::Future, sync::Arc};

use crate::session::AuthSession;

tokio::task_local! {
    static CURRENT_SESSION: Arc<AuthSession>;
}

impl AuthSession {
    /// Run `fut` with this session available through [`auth`].
    pub async fn scope<F: Future>(self: Arc<Self>, fut: F) -> F::Output {
        CURRENT_SESSION.scope(self, fut).await
    }
}

/// The session installed by the enclosing [`AuthSession::scope`].
///
/// # Panics
///
/// When called outside of any scope. Use [`try_auth`] where that is an
/// expected situation.
pub fn auth() -> Arc<AuthSession> {
    match try_auth() {
        Some(session) => session,
        None => panic!("auth() must be used within an AuthSession scope"),
    }
}

pub fn try_auth() -> Option<Arc<AuthSession>> {
    CURRENT_SESSION.try_with(Arc::clone).ok()
}
