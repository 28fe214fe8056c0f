use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials sent to the login and registration endpoints.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct AuthLoginParams {
    /// The email address of the user to authenticate as.
    pub email: String,

    /// The password of the user to authenticate as.
    pub password: String,
}

impl std::fmt::Debug for AuthLoginParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthLoginParams")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
