//! Client side of Latch: the login session, where it is persisted, and the
//! HTTP calls that establish it.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiClientError, AuthApi};
pub use context::{auth, try_auth};
pub use error::SessionError;
pub use session::{AuthSession, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Mutation, StorageError};
