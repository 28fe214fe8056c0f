//! Server-side user records for Latch.
//!
//! [`schema::UserSchema`] turns creation and update requests into validated
//! [`models::DbUser`] records. The [`storage`] backends persist them and
//! enforce the uniqueness of emails and refresh tokens.

pub mod models;
pub mod schema;
pub mod storage;
