use std::sync::Arc;

use crate::{models::DbUser, schema::PasswordHashPredicate};

/// One validation rule, attached to one field.
pub trait FieldRule: Send + Sync {
    /// External name of the field this rule guards.
    fn field(&self) -> &'static str;

    /// `Err` carries a human-readable reason.
    fn check(&self, candidate: &DbUser) -> Result<(), String>;
}

/// The field must be a non-empty string.
pub struct Required {
    field: &'static str,
    get: fn(&DbUser) -> &str,
}

impl Required {
    pub fn new(field: &'static str, get: fn(&DbUser) -> &str) -> Self {
        Self { field, get }
    }
}

impl FieldRule for Required {
    fn field(&self) -> &'static str {
        self.field
    }

    fn check(&self, candidate: &DbUser) -> Result<(), String> {
        if (self.get)(candidate).is_empty() {
            return Err(format!("{} is required", self.field));
        }
        Ok(())
    }
}

/// The stored password must look like a hash according to the configured
/// predicate.
pub struct PasswordHash {
    predicate: Arc<dyn PasswordHashPredicate>,
}

impl PasswordHash {
    pub fn new(predicate: Arc<dyn PasswordHashPredicate>) -> Self {
        Self { predicate }
    }
}

impl FieldRule for PasswordHash {
    fn field(&self) -> &'static str {
        "password"
    }

    fn check(&self, candidate: &DbUser) -> Result<(), String> {
        if self.predicate.is_password_hash(&candidate.password_hash) {
            Ok(())
        } else {
            Err("Invalid password hash".into())
        }
    }
}
