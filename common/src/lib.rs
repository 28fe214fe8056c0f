//! Data contract shared by the Latch client and server crates.
//!
//! Nothing in here talks to the network or a database. It only describes the
//! shapes that cross the wire: the public [`views::User`], the
//! [`views::AuthGrant`] returned by login and registration, request
//! [`params`], and the closed [`roles::Role`] enumeration.

pub mod params;
pub mod roles;
pub mod views;
