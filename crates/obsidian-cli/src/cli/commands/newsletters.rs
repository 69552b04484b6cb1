//! Newsletter command handlers.

use anyhow::Result;
use obsidian_core::admin::Newsletters;
use obsidian_core::router::AdminRoute;
use uuid::Uuid;

use super::{page_footer, short_date, table};
use crate::cli::app::App;

pub async fn list(app: &App, page: u32) -> Result<()> {
    app.require_admin(AdminRoute::Newsletters).await?;
    let listing = Newsletters::new(app.client()).list(page).await?;

    if listing.items().is_empty() {
        println!("No newsletters found.");
        return Ok(());
    }
    let mut t = table(&["ID", "Title", "Edition", "Status", "Sent", "Recipients"]);
    for newsletter in listing.items() {
        t.add_row(vec![
            newsletter.id.to_string(),
            newsletter.title.clone(),
            newsletter.edition_date.to_string(),
            newsletter.status.to_string(),
            short_date(newsletter.sent_at),
            newsletter.total_subscribers.to_string(),
        ]);
    }
    println!("{t}");
    page_footer(&listing, page);
    Ok(())
}

pub async fn show(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Newsletters).await?;
    let newsletter = Newsletters::new(app.client()).get(id).await?;

    println!("{} ({})", newsletter.title, newsletter.status);
    println!("Edition: {}", newsletter.edition_date);
    if let Some(featured) = &newsletter.featured_article {
        println!("Featured: {}", featured.title);
    }
    for article in &newsletter.articles {
        println!("  - [{}] {}", article.sport_name(), article.title);
    }
    for fixture in &newsletter.fixtures {
        println!(
            "  * {} ({})",
            fixture.headline(),
            fixture.match_date.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub async fn send(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Newsletters).await?;
    let receipt = Newsletters::new(app.client()).send(id).await?;
    match receipt.task_id {
        Some(task_id) => println!("{} (task {task_id})", receipt.message),
        None => println!("{}", receipt.message),
    }
    Ok(())
}

pub async fn report(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Analytics).await?;
    let report = Newsletters::new(app.client()).delivery_report(id).await?;

    let mut t = table(&["Sent", "Failed", "Bounced", "Opened", "Clicked", "Open rate"]);
    t.add_row(vec![
        report.total_sent.to_string(),
        report.total_failed.to_string(),
        report.total_bounced.to_string(),
        report.total_opened.to_string(),
        report.total_clicked.to_string(),
        format!("{:.1}%", report.open_rate()),
    ]);
    println!("{t}");

    if !report.failure_reasons.is_empty() {
        let mut t = table(&["Failure", "Count"]);
        for reason in &report.failure_reasons {
            t.add_row(vec![reason.error_message.clone(), reason.count.to_string()]);
        }
        println!("{t}");
    }
    Ok(())
}

pub async fn delete(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Newsletters).await?;
    Newsletters::new(app.client()).delete(id).await?;
    println!("Deleted newsletter {id}");
    Ok(())
}
