//! Dashboard command handler.

use anyhow::Result;
use obsidian_core::dashboard::DashboardSlice;
use obsidian_core::router::AdminRoute;

use super::table;
use crate::cli::app::App;

pub async fn show(app: &App, days: u32) -> Result<()> {
    app.require_admin(AdminRoute::Dashboard).await?;

    let mut dashboard = DashboardSlice::new();
    if let Err(err) = dashboard.fetch_all(app.client(), days).await {
        eprintln!("Warning: {err}");
    }

    if let Some(overview) = &dashboard.overview.data {
        let stats = &overview.overview;
        let mut t = table(&["Metric", "Value"]);
        t.add_row(vec![
            "Subscribers".to_string(),
            stats.total_subscribers.to_string(),
        ]);
        t.add_row(vec!["Active".to_string(), stats.active_subscribers.to_string()]);
        t.add_row(vec![
            "Newsletters sent".to_string(),
            format!("{} / {}", stats.sent_newsletters, stats.total_newsletters),
        ]);
        t.add_row(vec!["Open rate".to_string(), format!("{:.1}%", stats.open_rate)]);
        t.add_row(vec!["Growth".to_string(), format!("{:.1}%", stats.growth_rate)]);
        t.add_row(vec![
            "Articles".to_string(),
            overview.quick_stats.total_articles.to_string(),
        ]);
        t.add_row(vec![
            "Fixtures".to_string(),
            overview.quick_stats.total_fixtures.to_string(),
        ]);
        println!("{t}");
    }

    if let Some(subscribers) = &dashboard.subscribers.data {
        println!("\nSubscriber growth (last {days} days)");
        let mut t = table(&["Date", "Total", "New"]);
        for point in subscribers.growth_series() {
            t.add_row(vec![
                point.date.to_string(),
                point.total.to_string(),
                point.new.to_string(),
            ]);
        }
        println!("{t}");

        let sports = subscribers.sport_breakdown();
        if !sports.is_empty() {
            println!("\nSport preferences");
            let mut t = table(&["Sport", "Subscribers"]);
            for (sport, count) in sports {
                t.add_row(vec![sport, count.to_string()]);
            }
            println!("{t}");
        }
    }

    if let Some(newsletters) = &dashboard.newsletters.data {
        let rates = newsletters.campaign_rates();
        if !rates.is_empty() {
            println!("\nRecent campaigns");
            let mut t = table(&["Newsletter", "Open rate", "Click rate"]);
            for campaign in rates {
                t.add_row(vec![
                    campaign.title,
                    format!("{:.1}%", campaign.open_rate),
                    format!("{:.1}%", campaign.click_rate),
                ]);
            }
            println!("{t}");
        }
    }

    if let Some(content) = &dashboard.content.data {
        let fixtures = &content.fixture_stats;
        println!(
            "\nFixtures: {} total, {} upcoming, {} this week",
            fixtures.total_fixtures, fixtures.upcoming_fixtures, fixtures.this_week
        );
    }

    if let Some(updated) = dashboard.last_updated {
        println!("\nUpdated {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}
