//! In-process user store.
//!
//! All writes go through one [`RwLock`], which is what makes the unique
//! indexes hold under concurrent creation: the check and the insert happen
//! under the same write guard.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use latch_common::params::PaginationParams;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{
    models::{DbUlid, DbUser},
    schema::{NewUser, UserSchema, UserUpdate, normalize_email},
    storage::{Storage, StoreError, UserFilter, UserStore, page_limit},
};

#[derive(Default)]
struct Collection {
    users: BTreeMap<DbUlid, DbUser>,
    by_email: HashMap<String, DbUlid>,
    by_refresh_token: HashMap<String, DbUlid>,
}

impl Collection {
    /// Fails if `candidate` would collide with a record other than itself.
    fn check_unique(&self, candidate: &DbUser) -> Result<(), StoreError> {
        let taken = |index: &HashMap<String, DbUlid>, key: &str| {
            index.get(key).is_some_and(|owner| *owner != candidate.id)
        };

        if taken(&self.by_email, &candidate.email) {
            return Err(StoreError::DuplicateKey { field: "email" });
        }
        if taken(&self.by_refresh_token, &candidate.refresh_token) {
            return Err(StoreError::DuplicateKey {
                field: "refreshToken",
            });
        }
        Ok(())
    }

    fn put(&mut self, user: DbUser) {
        if let Some(previous) = self.users.get(&user.id) {
            self.by_email.remove(&previous.email);
            self.by_refresh_token.remove(&previous.refresh_token);
        }
        self.by_email.insert(user.email.clone(), user.id);
        self.by_refresh_token
            .insert(user.refresh_token.clone(), user.id);
        self.users.insert(user.id, user);
    }

    fn lookup(&self, index: &HashMap<String, DbUlid>, key: &str) -> Option<DbUser> {
        index.get(key).and_then(|id| self.users.get(id)).cloned()
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    schema: UserSchema,
    inner: RwLock<Collection>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: UserSchema) -> Self {
        Self {
            schema,
            inner: RwLock::default(),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    #[instrument(skip(self))]
    async fn create(&self, user: NewUser) -> Result<DbUser, StoreError> {
        let user = self.schema.build(user)?;

        let mut inner = self.inner.write().await;
        inner.check_unique(&user)?;
        inner.put(user.clone());

        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get(&self, id: &str) -> Result<Option<DbUser>, StoreError> {
        let Some(id) = DbUlid::from_string(id) else {
            return Ok(None);
        };
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.lookup(&inner.by_email, &normalize_email(email)))
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<DbUser>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.lookup(&inner.by_refresh_token, token))
    }

    async fn list(
        &self,
        filter: UserFilter,
        pagination: PaginationParams,
    ) -> Result<Vec<DbUser>, StoreError> {
        let ids: Option<Vec<DbUlid>> = filter
            .id
            .map(|ids| ids.iter().filter_map(|id| DbUlid::from_string(id)).collect());
        let emails: Option<Vec<String>> = filter
            .email
            .map(|emails| emails.iter().map(|e| normalize_email(e)).collect());
        let after = pagination
            .next_token
            .as_deref()
            .and_then(DbUlid::from_string);
        let limit = page_limit(&pagination) as usize;

        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| after.is_none_or(|after| u.id > after))
            .filter(|u| ids.as_ref().is_none_or(|ids| ids.contains(&u.id)))
            .filter(|u| emails.as_ref().is_none_or(|emails| emails.contains(&u.email)))
            .take(limit)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn update(&self, id: &str, update: UserUpdate) -> Result<DbUser, StoreError> {
        let id = DbUlid::from_string(id).ok_or(StoreError::NotFound)?;

        let mut inner = self.inner.write().await;
        let current = inner.users.get(&id).ok_or(StoreError::NotFound)?;
        let updated = self.schema.apply(current, update)?;
        inner.check_unique(&updated)?;
        inner.put(updated.clone());

        debug!(user_id = %id, "Updated user");
        Ok(updated)
    }
}
