//! Newsletter email rendering.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use obsidian_core::admin::Newsletters;
use obsidian_core::email::{NewsletterEmail, render_newsletter};
use obsidian_core::newsletter::NewsletterSlice;
use obsidian_core::router::AdminRoute;
use uuid::Uuid;

use crate::cli::app::App;

pub async fn render(
    app: &App,
    newsletter: Option<Uuid>,
    site_url: &str,
    output: Option<&Path>,
) -> Result<()> {
    let newsletter = match newsletter {
        Some(id) => {
            app.require_admin(AdminRoute::Newsletters).await?;
            Newsletters::new(app.client()).get(id).await?
        }
        None => NewsletterSlice::new().fetch_latest(app.client()).await?,
    };

    let email = NewsletterEmail::from_newsletter(&newsletter, site_url, Utc::now().date_naive());
    let html = render_newsletter(&email)?;

    match output {
        Some(path) => {
            fs::write(path, &html)
                .with_context(|| format!("write newsletter to {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}
