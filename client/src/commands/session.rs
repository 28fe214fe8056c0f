use anyhow::{Context, Result};
use latch_client::auth;

pub async fn login(email: &str, password: &str) -> Result<()> {
    let user = auth().login(email, password).await.context("Login failed")?;

    println!("✓ Logged in as {}", user.email);
    println!("  User ID: {}", user.id);
    println!("  Role: {}", user.role);

    Ok(())
}

pub async fn register(email: &str, password: &str) -> Result<()> {
    let user = auth()
        .register(email, password)
        .await
        .context("Registration failed")?;

    println!("✓ Registered {}", user.email);
    println!("  User ID: {}", user.id);

    Ok(())
}

pub async fn logout() -> Result<()> {
    auth().logout().await.context("Failed to clear session")?;
    println!("✓ Logged out");

    Ok(())
}

pub fn whoami() -> Result<()> {
    let session = auth();

    match (session.is_authenticated(), session.current_user()) {
        (true, Some(user)) => {
            println!("{} ({})", user.email, user.role);
            println!("  User ID: {}", user.id);
            println!("  Last login: {}", user.last_login_at);
        }
        (true, None) => println!("Logged in, but no user details are stored"),
        (false, _) => println!("Not logged in"),
    }

    Ok(())
}
