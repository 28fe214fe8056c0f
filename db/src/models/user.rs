use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use latch_common::{roles::Role, views::User};
use serde::{Serialize, Serializer};

use crate::models::DbUlid;

/// A persisted user account.
///
/// Records are produced by [`UserSchema`](crate::schema::UserSchema), which
/// applies defaults and field rules, so a `DbUser` in hand has already passed
/// validation. `created_at` has no setter; it is fixed when the record is
/// built.
///
/// Serializing a `DbUser` yields its public [`User`] view. The password hash
/// never leaves through serde, `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct DbUser {
    pub id: DbUlid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub last_login_at: DateTime<Utc>,
    pub is_active: bool,
    pub refresh_token: String,
    created_at: DateTime<Utc>,
}

impl DbUser {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: DbUlid,
        email: String,
        password_hash: String,
        role: Role,
        created_at: DateTime<Utc>,
        last_login_at: DateTime<Utc>,
        is_active: bool,
        refresh_token: String,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            role,
            last_login_at,
            is_active,
            refresh_token,
            created_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The public projection of this record.
    pub fn to_view(&self) -> User {
        User {
            id: self.id.to_string(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
            is_active: self.is_active,
            refresh_token: Some(self.refresh_token.clone()),
        }
    }
}

impl Display for DbUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DbUser {{ id: {}, email: {}, role: {} }}",
            self.id, self.email, self.role
        )
    }
}

impl fmt::Debug for DbUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

impl Serialize for DbUser {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_view().serialize(s)
    }
}

impl From<DbUser> for User {
    fn from(value: DbUser) -> Self {
        value.to_view()
    }
}

impl From<&DbUser> for User {
    fn from(value: &DbUser) -> Self {
        value.to_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "$2b$04$abcdefghijklmnopqrstuuH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe";

    fn user() -> DbUser {
        let now = Utc::now();
        DbUser::from_parts(
            DbUlid::new(),
            "alice@example.com".into(),
            HASH.into(),
            Role::User,
            now,
            now,
            true,
            "rt-1".into(),
        )
    }

    #[test]
    fn test_serialize_omits_password() {
        let json = serde_json::to_value(user()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("passwordHash"));
        assert!(!json.to_string().contains(HASH));

        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "_id",
                "createdAt",
                "email",
                "isActive",
                "lastLoginAt",
                "refreshToken",
                "role"
            ]
        );
    }

    #[test]
    fn test_debug_and_display_omit_password() {
        let u = user();
        assert!(!format!("{u:?}").contains(HASH));
        assert!(!format!("{u}").contains(HASH));
        assert!(format!("{u}").contains("alice@example.com"));
    }

    #[test]
    fn test_view_carries_public_fields() {
        let u = user();
        let view = User::from(&u);
        assert_eq!(view.id, u.id.to_string());
        assert_eq!(view.email, u.email);
        assert_eq!(view.created_at, u.created_at());
        assert_eq!(view.refresh_token.as_deref(), Some("rt-1"));
    }
}
