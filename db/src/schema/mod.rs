//! Validation and defaults for user records.
//!
//! A [`UserSchema`] owns an ordered list of [`FieldRule`]s. Creation
//! ([`UserSchema::build`]) and updates ([`UserSchema::apply`]) first produce
//! a candidate record with defaults filled in and the email lowercased, then
//! run every rule against it. The first failing rule wins and nothing is
//! written.
//!
//! Uniqueness of `email` and `refreshToken` is not a field rule: it needs the
//! whole collection, so the storage backends enforce it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use latch_common::roles::Role;
use thiserror::Error;
use tracing::debug;

use crate::models::{DbUlid, DbUser};

mod password;
mod rules;

pub use password::*;
pub use rules::*;

/// A write was rejected because one field failed its rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// External name of the offending field, e.g. `password`.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Request to create a user record.
#[derive(Clone, Default)]
pub struct NewUser {
    pub email: String,

    /// An already-computed password hash. Plaintext is rejected.
    pub password_hash: String,

    /// Role name; `user` when absent.
    pub role: Option<String>,

    /// Defaults to `true`.
    pub is_active: Option<bool>,

    /// Generated when absent.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// Partial update of a user record. `None` leaves a field untouched.
#[derive(Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub refresh_token: Option<String>,

    /// Creation time is immutable. A value here is ignored.
    pub created_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("email", &self.email)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("last_login_at", &self.last_login_at)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

pub struct UserSchema {
    rules: Vec<Box<dyn FieldRule>>,
}

impl UserSchema {
    /// The standard rule set, checking passwords with `predicate`.
    pub fn new(predicate: impl PasswordHashPredicate + 'static) -> Self {
        let rules: Vec<Box<dyn FieldRule>> = vec![
            Box::new(Required::new("email", |u| u.email.as_str())),
            Box::new(Required::new("password", |u| u.password_hash.as_str())),
            Box::new(PasswordHash::new(Arc::new(predicate))),
            Box::new(Required::new("refreshToken", |u| u.refresh_token.as_str())),
        ];
        Self { rules }
    }

    /// Append an extra rule. Rules run in the order they were added.
    pub fn with_rule(mut self, rule: impl FieldRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Build a new record from `new`, stamped with the current time.
    pub fn build(&self, new: NewUser) -> Result<DbUser, ValidationError> {
        self.build_at(new, Utc::now())
    }

    pub fn build_at(&self, new: NewUser, now: DateTime<Utc>) -> Result<DbUser, ValidationError> {
        let role = parse_role(new.role.as_deref())?.unwrap_or_default();
        let refresh_token = new
            .refresh_token
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let candidate = DbUser::from_parts(
            DbUlid::new(),
            normalize_email(&new.email),
            new.password_hash,
            role,
            now,
            now,
            new.is_active.unwrap_or(true),
            refresh_token,
        );

        self.validate(&candidate)?;
        Ok(candidate)
    }

    /// Produce the updated version of `current`. `current` itself is left
    /// alone, so a rejected update has no effect.
    pub fn apply(&self, current: &DbUser, update: UserUpdate) -> Result<DbUser, ValidationError> {
        if let Some(attempted) = update.created_at {
            debug!(
                user_id = %current.id,
                %attempted,
                "Ignoring update to immutable createdAt"
            );
        }

        let mut candidate = current.clone();
        if let Some(email) = update.email {
            candidate.email = normalize_email(&email);
        }
        if let Some(password_hash) = update.password_hash {
            candidate.password_hash = password_hash;
        }
        if let Some(role) = parse_role(update.role.as_deref())? {
            candidate.role = role;
        }
        if let Some(last_login_at) = update.last_login_at {
            candidate.last_login_at = last_login_at;
        }
        if let Some(is_active) = update.is_active {
            candidate.is_active = is_active;
        }
        if let Some(refresh_token) = update.refresh_token {
            candidate.refresh_token = refresh_token;
        }

        self.validate(&candidate)?;
        Ok(candidate)
    }

    pub fn validate(&self, candidate: &DbUser) -> Result<(), ValidationError> {
        self.rules.iter().try_for_each(|rule| {
            rule.check(candidate)
                .map_err(|reason| ValidationError::new(rule.field(), reason))
        })
    }
}

impl Default for UserSchema {
    fn default() -> Self {
        Self::new(BcryptHash)
    }
}

/// Emails are stored lowercase so that uniqueness is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

fn parse_role(role: Option<&str>) -> Result<Option<Role>, ValidationError> {
    role.map(|r| {
        r.parse::<Role>()
            .map_err(|e| ValidationError::new("role", e.to_string()))
    })
    .transpose()
}

#[cfg(test)]
mod tests;
