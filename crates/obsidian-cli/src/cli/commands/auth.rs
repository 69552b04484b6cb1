//! Sign-in command handlers.

use anyhow::Result;
use obsidian_core::auth::LogoutOutcome;
use obsidian_core::router::AdminRoute;

use crate::cli::app::App;

pub async fn login(app: &App, username: &str, password: &str) -> Result<()> {
    let user = app.client().auth().login(username, password).await?;
    println!("Logged in as {}", user.display_name());
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.client().auth().initialize();
    match app.client().auth().logout().await {
        LogoutOutcome::Acknowledged => println!("Logged out."),
        LogoutOutcome::LocalOnly => println!("Logged out (local session cleared)."),
    }
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let session = app.require_admin(AdminRoute::Dashboard).await?;
    let Some(user) = session.user else {
        println!("Signed in (profile unavailable)");
        return Ok(());
    };

    println!("{}", user.display_name());
    println!("  username: {}", user.username);
    if let Some(email) = &user.email {
        println!("  email:    {email}");
    }
    if let Some(role) = &user.role {
        println!("  role:     {role}");
    }
    if !user.permissions.is_empty() {
        println!("  permissions: {}", user.permissions.join(", "));
    }
    Ok(())
}
