//! Public newsletter command handlers.

use anyhow::Result;
use obsidian_core::models::SubscriberPreferences;
use obsidian_core::newsletter::{NewsletterSlice, Subscription};

use super::{short_date, table};
use crate::cli::app::App;

pub async fn subscribe(app: &App, email: &str, name: &str, sports: Vec<String>) -> Result<()> {
    let mut subscription = Subscription::new(email, name);
    if !sports.is_empty() {
        subscription = subscription.with_sports(sports);
    }

    let response = NewsletterSlice::new()
        .subscribe(app.client(), &subscription)
        .await?;
    println!("{}", response.message);
    Ok(())
}

pub async fn unsubscribe(app: &App, token: &str) -> Result<()> {
    let message = NewsletterSlice::new()
        .unsubscribe(app.client(), token)
        .await?;
    println!("{message}");
    Ok(())
}

pub async fn preferences(app: &App, token: &str, sports: Vec<String>) -> Result<()> {
    let mut slice = NewsletterSlice::new();
    let page = slice.fetch_preferences(app.client(), token).await?;

    if sports.is_empty() {
        let subscriber = &page.subscriber;
        println!("{} <{}> ({})", subscriber.name, subscriber.email, subscriber.status);
        println!("Following: {}", display_sports(&subscriber.preferences));
        let available: Vec<&str> = page
            .available_sports
            .iter()
            .filter(|sport| sport.is_active)
            .map(|sport| sport.name.as_str())
            .collect();
        println!("Available: {}", available.join(", "));
        return Ok(());
    }

    let preferences = SubscriberPreferences {
        sports,
        ..page.subscriber.preferences.clone()
    };
    let message = slice
        .update_preferences(app.client(), token, &preferences)
        .await?;
    println!("{message}");
    Ok(())
}

fn display_sports(preferences: &SubscriberPreferences) -> String {
    if preferences.sports.is_empty() {
        "all sports".to_string()
    } else {
        preferences.sports.join(", ")
    }
}

pub async fn sports(app: &App) -> Result<()> {
    let sports = NewsletterSlice::new()
        .fetch_sport_categories(app.client())
        .await?;
    let mut t = table(&["Name", "Display name", "Active"]);
    for sport in sports {
        t.add_row(vec![
            sport.name,
            sport.display_name,
            if sport.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn news(app: &App, sport: Option<&str>, limit: u32) -> Result<()> {
    let articles = NewsletterSlice::new()
        .fetch_news(app.client(), sport, limit)
        .await?;
    if articles.is_empty() {
        println!("No news found.");
        return Ok(());
    }
    let mut t = table(&["Title", "Sport", "Source", "Published"]);
    for article in &articles {
        t.add_row(vec![
            article.title.clone(),
            article.sport_name().to_string(),
            article.source_name.clone().unwrap_or_default(),
            short_date(article.publish_date),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn fixtures(app: &App, sport: Option<&str>, days: u32) -> Result<()> {
    let fixtures = NewsletterSlice::new()
        .fetch_fixtures(app.client(), sport, days)
        .await?;
    if fixtures.is_empty() {
        println!("No fixtures in the next {days} days.");
        return Ok(());
    }
    let mut t = table(&["Match", "Competition", "Venue", "Kick-off"]);
    for fixture in &fixtures {
        t.add_row(vec![
            fixture.headline(),
            fixture.league_competition.clone(),
            fixture.venue.clone(),
            fixture.match_date.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub async fn latest(app: &App) -> Result<()> {
    let newsletter = NewsletterSlice::new().fetch_latest(app.client()).await?;
    println!("{} ({})", newsletter.title, newsletter.edition_date);
    if let Some(featured) = &newsletter.featured_article {
        println!("\n{}\n{}", featured.title, featured.summary);
    }
    for article in &newsletter.articles {
        println!("  - [{}] {}", article.sport_name(), article.title);
    }
    Ok(())
}
