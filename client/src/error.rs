use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{message}")]
    Login { message: String },

    #[error("{message}")]
    Registration { message: String },

    /// The server answered with a grant that carries no tokens at all.
    #[error("Neither refreshToken nor accessToken was returned.")]
    MissingTokens,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
