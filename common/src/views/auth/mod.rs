use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::views::User;

/// Response body of the login and registration endpoints.
///
/// On the wire this is a flat object: the two tokens sit next to the user's
/// own fields.
///
/// ```json
/// { "accessToken": "...", "refreshToken": "...", "_id": "...", "email": "..." }
/// ```
///
/// Both tokens are optional at the decoding stage so that a response missing
/// them can be told apart from one that failed to parse. Use
/// [`AuthGrant::has_tokens`] before trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    /// Short-lived bearer token for authenticated requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Longer-lived token used to obtain new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(flatten)]
    pub user: User,
}

impl AuthGrant {
    /// True when at least one of the two tokens is present and non-empty.
    pub fn has_tokens(&self) -> bool {
        [&self.access_token, &self.refresh_token]
            .into_iter()
            .any(|token| token.as_deref().is_some_and(|t| !t.is_empty()))
    }
}
