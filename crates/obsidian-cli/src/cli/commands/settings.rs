//! Settings command handlers.

use anyhow::{Context, Result};
use obsidian_core::admin::{AdminSettings, PasswordChange, Settings};
use obsidian_core::router::AdminRoute;
use serde_json::Value;

use crate::cli::app::App;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SectionArg {
    Profile,
    Email,
    Notifications,
    Template,
}

impl SectionArg {
    fn key(self) -> &'static str {
        match self {
            SectionArg::Profile => "profile",
            SectionArg::Email => "email",
            SectionArg::Notifications => "notifications",
            SectionArg::Template => "template",
        }
    }
}

pub async fn show(app: &App) -> Result<()> {
    app.require_admin(AdminRoute::Settings).await?;
    let settings = Settings::new(app.client()).load().await?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub async fn set(app: &App, section: SectionArg, fields: &[String]) -> Result<()> {
    app.require_admin(AdminRoute::Settings).await?;
    let settings = Settings::new(app.client());
    let current = settings.load().await?;
    let updated = apply_fields(&current, section, fields)?;

    match section {
        SectionArg::Profile => settings.save_profile(&updated.profile).await?,
        SectionArg::Email => settings.save_email(&updated.email).await?,
        SectionArg::Notifications => settings.save_notifications(&updated.notifications).await?,
        SectionArg::Template => settings.save_template(&updated.template).await?,
    }
    println!("Saved {} settings", section.key());
    Ok(())
}

pub async fn password(app: &App, current: String, new: String, confirm: String) -> Result<()> {
    app.require_admin(AdminRoute::Settings).await?;
    let change = PasswordChange {
        current_password: current,
        new_password: new,
        confirm_password: confirm,
    };
    Settings::new(app.client()).change_password(&change).await?;
    println!("Password changed");
    Ok(())
}

/// Overlays `key=value` pairs on one section. Values that parse as JSON keep
/// their type (`587`, `true`); anything else is a string.
fn apply_fields(
    settings: &AdminSettings,
    section: SectionArg,
    fields: &[String],
) -> Result<AdminSettings> {
    let mut root = serde_json::to_value(settings).context("encode settings")?;
    let Some(Value::Object(target)) = root.get_mut(section.key()) else {
        anyhow::bail!("Unknown settings section: {}", section.key());
    };

    for field in fields {
        let (key, raw) = field
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{field}'"))?;
        let key = key.trim();
        let Some(existing) = target.get(key) else {
            let known: Vec<&str> = target.keys().map(String::as_str).collect();
            anyhow::bail!(
                "Unknown {} setting '{key}' (expected one of: {})",
                section.key(),
                known.join(", ")
            );
        };
        let value = match existing {
            Value::String(_) => Value::String(raw.to_string()),
            _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        };
        target.insert(key.to_string(), value);
    }

    serde_json::from_value(root)
        .with_context(|| format!("Invalid value for {} settings", section.key()))
}
