use async_trait::async_trait;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use latch_common::{params::PaginationParams, roles::Role};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    models::{DbUlid, DbUser},
    schema::{NewUser, UserSchema, UserUpdate, normalize_email},
    storage::{Storage, StoreError, UserFilter, UserStore, page_limit},
};

pub const MONGODB_COLLECTION_USERS: &str = "users";

const EMAIL_INDEX: &str = "email_unique";
const REFRESH_TOKEN_INDEX: &str = "refresh_token_unique";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// On-disk shape of a user. This is the only place the password hash is
/// serialized; everything outward goes through [`DbUser`]'s public view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: DbUlid,
    email: String,
    password: String,
    role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    last_login_at: DateTime<Utc>,
    is_active: bool,
    refresh_token: String,
}

impl From<&DbUser> for UserDocument {
    fn from(user: &DbUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            password: user.password_hash.clone(),
            role: user.role,
            created_at: user.created_at(),
            last_login_at: user.last_login_at,
            is_active: user.is_active,
            refresh_token: user.refresh_token.clone(),
        }
    }
}

impl From<UserDocument> for DbUser {
    fn from(doc: UserDocument) -> Self {
        DbUser::from_parts(
            doc.id,
            doc.email,
            doc.password,
            doc.role,
            doc.created_at,
            doc.last_login_at,
            doc.is_active,
            doc.refresh_token,
        )
    }
}

pub struct MongoDBStorage {
    client: Client,
    schema: UserSchema,
}

impl MongoDBStorage {
    pub async fn new(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            client,
            schema: UserSchema::default(),
        })
    }

    pub fn with_schema(mut self, schema: UserSchema) -> Self {
        self.schema = schema;
        self
    }

    fn get_db(&self) -> Database {
        self.client
            .default_database()
            .unwrap_or_else(|| self.client.database("latch"))
    }

    fn users(&self) -> Collection<UserDocument> {
        self.get_db()
            .collection::<UserDocument>(MONGODB_COLLECTION_USERS)
    }

    /// Create the unique indexes on `email` and `refreshToken`. Safe to call
    /// on every startup.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(name.to_string())
                        .build(),
                )
                .build()
        };

        self.users()
            .create_indexes([
                unique(doc! { "email": 1 }, EMAIL_INDEX),
                unique(doc! { "refreshToken": 1 }, REFRESH_TOKEN_INDEX),
            ])
            .await?;

        info!("User indexes ensured");
        Ok(())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<DbUser>, StoreError> {
        Ok(self.users().find_one(filter).await?.map(DbUser::from))
    }
}

/// Turn a unique-index violation into [`StoreError::DuplicateKey`]; pass
/// everything else through.
fn map_write_error(err: mongodb::error::Error) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => {
            Some(duplicate_field(&e.message))
        }
        ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => Some(duplicate_field(&e.message)),
        _ => None,
    };

    match duplicate {
        Some(field) => StoreError::DuplicateKey { field },
        None => StoreError::MongoDB(err),
    }
}

fn duplicate_field(message: &str) -> &'static str {
    if message.contains(&format!("index: {REFRESH_TOKEN_INDEX} "))
        || message.contains("dup key: { refreshToken:")
    {
        "refreshToken"
    } else {
        "email"
    }
}

#[async_trait]
impl Storage for MongoDBStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_db().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoDBStorage {
    #[instrument(skip(self))]
    async fn create(&self, user: NewUser) -> Result<DbUser, StoreError> {
        let user = self.schema.build(user)?;

        self.users()
            .insert_one(UserDocument::from(&user))
            .await
            .map_err(map_write_error)?;

        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get(&self, id: &str) -> Result<Option<DbUser>, StoreError> {
        let Some(id) = DbUlid::from_string(id) else {
            return Ok(None);
        };
        self.find_one(doc! { "_id": id }).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, StoreError> {
        self.find_one(doc! { "email": normalize_email(email) }).await
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<DbUser>, StoreError> {
        self.find_one(doc! { "refreshToken": token }).await
    }

    async fn list(
        &self,
        filter: UserFilter,
        pagination: PaginationParams,
    ) -> Result<Vec<DbUser>, StoreError> {
        let mut filter_doc = doc! {};
        let mut id_clauses = doc! {};
        if let Some(ids) = filter.id {
            let ids: Vec<DbUlid> = ids.iter().filter_map(|id| DbUlid::from_string(id)).collect();
            id_clauses.insert("$in", ids);
        }
        if let Some(after) = pagination
            .next_token
            .as_deref()
            .and_then(DbUlid::from_string)
        {
            id_clauses.insert("$gt", after);
        }
        if !id_clauses.is_empty() {
            filter_doc.insert("_id", id_clauses);
        }
        if let Some(emails) = filter.email {
            let emails: Vec<String> = emails.iter().map(|e| normalize_email(e)).collect();
            filter_doc.insert("email", doc! { "$in": emails });
        }

        let limit = page_limit(&pagination) as i64;
        let find_options = FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .limit(limit)
            .build();

        let docs: Vec<UserDocument> = self
            .users()
            .find(filter_doc)
            .with_options(find_options)
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().map(DbUser::from).collect())
    }

    #[instrument(skip(self))]
    async fn update(&self, id: &str, update: UserUpdate) -> Result<DbUser, StoreError> {
        let id = DbUlid::from_string(id).ok_or(StoreError::NotFound)?;
        let current = self
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(StoreError::NotFound)?;

        let updated = self.schema.apply(&current, update)?;

        let result = self
            .users()
            .replace_one(doc! { "_id": id }, UserDocument::from(&updated))
            .await
            .map_err(map_write_error)?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }

        debug!(user_id = %id, "Updated user");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_from_server_message() {
        let email = "E11000 duplicate key error collection: latch.users index: email_unique dup key: { email: \"a@b.com\" }";
        assert_eq!(duplicate_field(email), "email");

        let token = "E11000 duplicate key error collection: latch.users index: refresh_token_unique dup key: { refreshToken: \"x\" }";
        assert_eq!(duplicate_field(token), "refreshToken");
    }

    #[test]
    fn test_duplicate_field_ignores_index_name_inside_email() {
        let email = "E11000 duplicate key error collection: latch.users index: email_unique dup key: { email: \"refresh_token_unique@b.com\" }";
        assert_eq!(duplicate_field(email), "email");
    }

    #[test]
    fn test_document_keeps_password_for_storage_only() {
        let user = UserSchema::default()
            .build(NewUser {
                email: "alice@example.com".into(),
                password_hash: "$2b$04$abcdefghijklmnopqrstuuH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe".into(),
                ..Default::default()
            })
            .unwrap();

        let doc = bson::to_document(&UserDocument::from(&user)).unwrap();
        assert!(doc.contains_key("password"));
        assert!(doc.contains_key("refreshToken"));
        assert!(doc.get_datetime("createdAt").is_ok());

        let back: UserDocument = bson::from_document(doc).unwrap();
        let loaded = DbUser::from(back);
        assert_eq!(loaded, user);

        let outward = serde_json::to_value(&loaded).unwrap();
        assert!(outward.get("password").is_none());
        assert!(outward.get("passwordHash").is_none());
        assert!(!outward.to_string().contains(&user.password_hash));
        assert_eq!(outward["email"], "alice@example.com");
    }
}
