use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::roles::Role;

/// The public view of a user account. This is the only shape a user record
/// takes once it leaves the server, so it has no password field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier for this user.
    #[serde(rename = "_id")]
    pub id: String,

    /// The user's email address, always lowercase.
    pub email: String,

    pub role: Role,

    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,

    /// Whether the account is active. Deactivation is handled elsewhere.
    pub is_active: bool,

    /// The account's refresh token. Absent when the view was taken out of an
    /// [`AuthGrant`](crate::views::AuthGrant), which carries the token itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
