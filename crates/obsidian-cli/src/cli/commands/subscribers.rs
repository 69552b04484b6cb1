//! Subscriber command handlers.

use anyhow::Result;
use obsidian_core::admin::{BulkAction, PageQuery, SubscriberFilter, Subscribers, parse_ids};
use obsidian_core::models::{Subscriber, SubscriberStatus};
use obsidian_core::router::AdminRoute;
use uuid::Uuid;

use super::{page_footer, short_date, table};
use crate::cli::app::App;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
    Unsubscribed,
}

impl From<StatusArg> for SubscriberStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => SubscriberStatus::Active,
            StatusArg::Inactive => SubscriberStatus::Inactive,
            StatusArg::Unsubscribed => SubscriberStatus::Unsubscribed,
        }
    }
}

fn row(subscriber: &Subscriber) -> Vec<String> {
    vec![
        subscriber.id.to_string(),
        subscriber.name.clone(),
        subscriber.email.clone(),
        subscriber.status.to_string(),
        subscriber.preferences.sports.join(", "),
        short_date(subscriber.subscription_date),
    ]
}

const HEADER: [&str; 6] = ["ID", "Name", "Email", "Status", "Sports", "Joined"];

pub async fn list(
    app: &App,
    page: u32,
    search: Option<String>,
    status: Option<StatusArg>,
    sport: Option<String>,
) -> Result<()> {
    app.require_admin(AdminRoute::Subscribers).await?;

    let filter = SubscriberFilter {
        page: PageQuery {
            page,
            search,
            sport,
        },
        status: status.map(Into::into),
    };
    let listing = Subscribers::new(app.client()).list(&filter).await?;

    if listing.items().is_empty() {
        println!("No subscribers found.");
        return Ok(());
    }
    let mut t = table(&HEADER);
    for subscriber in listing.items() {
        t.add_row(row(subscriber));
    }
    println!("{t}");
    page_footer(&listing, page);
    Ok(())
}

pub async fn show(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Subscribers).await?;
    let subscriber = Subscribers::new(app.client()).get(id).await?;
    let mut t = table(&HEADER);
    t.add_row(row(&subscriber));
    println!("{t}");
    Ok(())
}

pub async fn change_status(app: &App, id: Uuid, status: StatusArg) -> Result<()> {
    app.require_admin(AdminRoute::Subscribers).await?;
    let change = Subscribers::new(app.client())
        .change_status(id, status.into())
        .await?;
    println!("{}", change.message);
    Ok(())
}

pub async fn bulk(app: &App, action: BulkAction, raw_ids: &[String]) -> Result<()> {
    let ids = parse_ids(raw_ids)?;
    app.require_admin(AdminRoute::Subscribers).await?;
    let message = Subscribers::new(app.client())
        .bulk_action(action, &ids)
        .await?;
    println!("{message}");
    Ok(())
}

pub async fn delete(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Subscribers).await?;
    Subscribers::new(app.client()).delete(id).await?;
    println!("Deleted subscriber {id}");
    Ok(())
}
