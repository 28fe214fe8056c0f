use anyhow::Context;
use clap::{Parser, Subcommand};
use latch_db::storage::{Storage, mongodb::MongoDBStorage};
use tracing_subscriber::EnvFilter;

use crate::commands::CreateUserParams;

mod commands;

#[derive(Parser)]
#[command(name = "latchctl")]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(
        short = 'D',
        long,
        env = "LATCH_DB_URL",
        default_value = "mongodb://localhost:27017/latch"
    )]
    db_url: String,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Create a user account from an existing password hash
    #[command(name = "create-user")]
    CreateUser(CreateUserParams),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or("latch=info,latch_client=info,latch_db=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let stg = MongoDBStorage::new(&args.db_url)
        .await
        .context("Failed to connect to MongoDB")?;
    stg.ping().await.context("MongoDB did not answer a ping")?;
    stg.ensure_indexes()
        .await
        .context("Failed to create user indexes")?;

    match args.command {
        Command::CreateUser(params) => commands::create_user(&stg, params).await,
    }
}
