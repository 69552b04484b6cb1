//! Content command handlers.

use anyhow::Result;
use obsidian_core::admin::{ArticleFilter, Content, FixtureFilter, PageQuery};
use obsidian_core::router::AdminRoute;
use uuid::Uuid;

use super::{page_footer, short_date, table};
use crate::cli::app::App;

pub async fn articles(
    app: &App,
    page: u32,
    search: Option<String>,
    sport: Option<String>,
    article_type: Option<String>,
) -> Result<()> {
    app.require_admin(AdminRoute::Content).await?;
    let filter = ArticleFilter {
        page: PageQuery {
            page,
            search,
            sport,
        },
        article_type,
    };
    let listing = Content::new(app.client()).articles(&filter).await?;

    if listing.items().is_empty() {
        println!("No articles found.");
        return Ok(());
    }
    let mut t = table(&["ID", "Title", "Sport", "Type", "Source", "Published"]);
    for article in listing.items() {
        t.add_row(vec![
            article.id.to_string(),
            article.title.clone(),
            article.sport_name().to_string(),
            article.article_type.clone().unwrap_or_default(),
            article.source_name.clone().unwrap_or_default(),
            short_date(article.publish_date),
        ]);
    }
    println!("{t}");
    page_footer(&listing, page);
    Ok(())
}

pub async fn fixtures(
    app: &App,
    page: u32,
    search: Option<String>,
    sport: Option<String>,
) -> Result<()> {
    app.require_admin(AdminRoute::Content).await?;
    let filter = FixtureFilter {
        page: PageQuery {
            page,
            search,
            sport,
        },
    };
    let listing = Content::new(app.client()).fixtures(&filter).await?;

    if listing.items().is_empty() {
        println!("No fixtures found.");
        return Ok(());
    }
    let mut t = table(&["ID", "Match", "Competition", "Venue", "Date", "Status"]);
    for fixture in listing.items() {
        t.add_row(vec![
            fixture.id.to_string(),
            fixture.headline(),
            fixture.league_competition.clone(),
            fixture.venue.clone(),
            fixture.match_date.format("%Y-%m-%d %H:%M").to_string(),
            fixture.status.clone(),
        ]);
    }
    println!("{t}");
    page_footer(&listing, page);
    Ok(())
}

pub async fn delete_article(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Content).await?;
    Content::new(app.client()).delete_article(id).await?;
    println!("Deleted article {id}");
    Ok(())
}

pub async fn delete_fixture(app: &App, id: Uuid) -> Result<()> {
    app.require_admin(AdminRoute::Content).await?;
    Content::new(app.client()).delete_fixture(id).await?;
    println!("Deleted fixture {id}");
    Ok(())
}
