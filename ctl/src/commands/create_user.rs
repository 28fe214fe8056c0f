use anyhow::bail;
use clap::Parser;
use latch_common::roles::Role;
use latch_db::{
    schema::NewUser,
    storage::{StoreError, UserStore},
};

#[derive(Clone, Parser)]
pub struct CreateUserParams {
    #[clap(short, long)]
    pub email: String,

    /// A bcrypt hash, e.g. from `htpasswd -bnBC 12 "" <password>`
    #[clap(short, long)]
    pub password_hash: String,

    /// `admin` or `user`; new accounts are `user` when omitted
    #[clap(short, long)]
    pub role: Option<Role>,
}

pub async fn create_user(
    stg: &impl UserStore,
    CreateUserParams {
        email,
        password_hash,
        role,
    }: CreateUserParams,
) -> anyhow::Result<()> {
    let new_user = NewUser {
        email,
        password_hash,
        role: role.map(|r| r.to_string()),
        ..Default::default()
    };

    let user = match stg.create(new_user).await {
        Ok(user) => user,
        Err(StoreError::DuplicateKey { field }) => {
            bail!("A user with that {field} already exists")
        }
        Err(e) => return Err(e.into()),
    };

    println!("Created user with ID {}", user.id);
    println!("  Email: {}", user.email);
    println!("  Role: {}", user.role);

    Ok(())
}
