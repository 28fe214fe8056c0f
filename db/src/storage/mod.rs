use async_trait::async_trait;
use chrono::{DateTime, Utc};
use latch_common::params::PaginationParams;
use thiserror::Error;

use crate::{
    models::DbUser,
    schema::{NewUser, UserUpdate, ValidationError},
};

pub mod memory;
pub mod mongodb;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Largest page either backend will return.
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// The page size both backends use: the requested limit, or the default,
/// kept within `1..=MAX_PAGE_LIMIT`.
pub fn page_limit(pagination: &PaginationParams) -> u64 {
    pagination
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A unique index rejected the write. `field` is `email` or
    /// `refreshToken`.
    #[error("Duplicate key: a user with this {field} already exists")]
    DuplicateKey { field: &'static str },

    #[error("Not found")]
    NotFound,

    #[error("Query Error: {0}")]
    MongoDB(#[from] ::mongodb::error::Error),

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

#[async_trait]
pub trait Storage: UserStore + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct UserFilter {
    pub id: Option<Vec<String>>,
    pub email: Option<Vec<String>>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Validate and insert a new record. Fails with
    /// [`StoreError::DuplicateKey`] when the email or refresh token is taken.
    async fn create(&self, user: NewUser) -> Result<DbUser, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<DbUser>, StoreError>;

    /// Look up by email. The argument is lowercased first.
    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, StoreError>;

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<DbUser>, StoreError>;

    /// Records ordered by id, which is creation order.
    async fn list(
        &self,
        filter: UserFilter,
        pagination: PaginationParams,
    ) -> Result<Vec<DbUser>, StoreError>;

    /// Validate and apply a partial update. Fails with
    /// [`StoreError::NotFound`] for unknown ids.
    async fn update(&self, id: &str, update: UserUpdate) -> Result<DbUser, StoreError>;

    /// Stamp a successful login.
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<DbUser, StoreError> {
        self.update(
            id,
            UserUpdate {
                last_login_at: Some(at),
                ..Default::default()
            },
        )
        .await
    }
}
