use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use latch_client::config::ClientConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "latch")]
pub struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(
        long,
        short,
        global = true,
        env = "LATCH_CONFIG_PATH",
        default_value = "/etc/latch/client.toml"
    )]
    config_path: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session locally
    Login {
        #[arg(long, short)]
        email: String,

        #[arg(long, short, env = "LATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in to it
    Register {
        #[arg(long, short)]
        email: String,

        #[arg(long, short, env = "LATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who the stored session belongs to
    Whoami,
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
    let config = ClientConfig::from_file(&args.config_path).with_context(|| {
        format!(
            "Failed to load config from {} - ensure the file exists and is valid TOML",
            args.config_path.display()
        )
    })?;

    let session = commands::open_session(&config)?;

    session
        .scope(async move {
            match args.command {
                Command::Login { email, password } => {
                    commands::session::login(&email, &password).await
                }
                Command::Register { email, password } => {
                    commands::session::register(&email, &password).await
                }
                Command::Logout => commands::session::logout().await,
                Command::Whoami => commands::session::whoami(),
            }
        })
        .await
}
