//! Cookie consent command handlers.

use anyhow::Result;
use obsidian_core::consent::{ConsentStore, CookieCategory};

pub fn show(consent: &ConsentStore) {
    match consent.consent() {
        Some(decision) => println!("Cookie consent: {decision}"),
        None => println!("No cookie choice recorded."),
    }
    for category in [
        CookieCategory::Essential,
        CookieCategory::Analytics,
        CookieCategory::Marketing,
    ] {
        let allowed = if consent.is_allowed(category) { "allowed" } else { "blocked" };
        println!("  {category}: {allowed}");
    }
}

pub fn accept(consent: &ConsentStore) -> Result<()> {
    consent.accept_all()?;
    println!("All cookies accepted.");
    Ok(())
}

pub fn decline(consent: &ConsentStore) -> Result<()> {
    consent.decline_all()?;
    println!("Only essential cookies allowed.");
    Ok(())
}

pub fn select(consent: &ConsentStore, analytics: bool, marketing: bool) -> Result<()> {
    consent.save_selection(analytics, marketing)?;
    show(consent);
    Ok(())
}

pub fn reset(consent: &ConsentStore) -> Result<()> {
    consent.reset()?;
    println!("Cookie choice cleared.");
    Ok(())
}
