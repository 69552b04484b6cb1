//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod consent;
pub mod content;
pub mod dashboard;
pub mod forms;
pub mod newsletters;
pub mod public;
pub mod settings;
pub mod subscribers;
pub mod template;

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use obsidian_core::models::Listing;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn short_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn page_footer<T>(listing: &Listing<T>, page: u32) {
    println!(
        "Page {} of {} ({} total)",
        page.max(1),
        listing.total_pages(),
        listing.total()
    );
}
