//! HTML newsletter email rendering.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;

use crate::models::{NewsArticle, Newsletter};

const TEMPLATE_NAME: &str = "newsletter.html";
const BRAND: &str = "Obsidian";
const TAGLINE: &str = "VIP SPORTS HOSPITALITY";
const PACKAGES_URL: &str = "https://obsidian.lifestyle/packages";

fn newsletter_template() -> &'static str {
    include_str!("newsletter.html")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeaturedArticle {
    pub category: String,
    pub title: String,
    pub excerpt: String,
    pub link: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub title: String,
    pub category: String,
    pub date: String,
    pub thumbnail: String,
}

/// Brand colours and logo, as configured in the admin template settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#fbbf24".to_string(),
            secondary_color: "#f59e0b".to_string(),
            logo_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

/// Everything the email shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsletterEmail {
    /// Preformatted edition date, e.g. `FRIDAY, DECEMBER 20, 2025`.
    pub date: String,
    pub featured: Option<FeaturedArticle>,
    pub articles: Vec<ArticleSummary>,
    pub theme: Theme,
    pub unsubscribe_url: Option<String>,
    pub preferences_url: Option<String>,
    pub view_online_url: Option<String>,
}

/// Uppercase long date used in the edition banner.
pub fn edition_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string().to_uppercase()
}

fn relative_age(published: NaiveDate, today: NaiveDate) -> String {
    match (today - published).num_days() {
        d if d <= 0 => "TODAY".to_string(),
        1 => "1 DAY AGO".to_string(),
        d => format!("{d} DAYS AGO"),
    }
}

impl NewsletterEmail {
    /// Builds the email for a backend newsletter edition.
    ///
    /// The featured article comes first; otherwise the first article is
    /// promoted. `site_url` is the public backend origin used for links.
    pub fn from_newsletter(newsletter: &Newsletter, site_url: &str, today: NaiveDate) -> Self {
        let site_url = site_url.trim_end_matches('/');
        let mut articles = newsletter.articles.iter();
        let featured = newsletter
            .featured_article
            .as_ref()
            .or_else(|| articles.next())
            .map(|article| FeaturedArticle {
                category: article.sport_name().to_uppercase(),
                title: article.title.clone(),
                excerpt: article.summary.clone(),
                link: format!("{site_url}/newsletter/view/{}/", newsletter.id),
                thumbnail: article.image_url.clone().unwrap_or_default(),
            });
        let featured_id = newsletter.featured_article.as_ref().map(|a| a.id);

        let articles = articles
            .filter(|article| Some(article.id) != featured_id)
            .map(|article| summarize(article, today))
            .collect();

        Self {
            date: edition_date(newsletter.edition_date),
            featured,
            articles,
            view_online_url: Some(format!("{site_url}/newsletter/view/{}/", newsletter.id)),
            ..Self::default()
        }
    }

    fn footer_links(&self) -> Vec<FooterLink> {
        [
            ("Unsubscribe", &self.unsubscribe_url),
            ("Update Preferences", &self.preferences_url),
            ("View Online", &self.view_online_url),
        ]
        .into_iter()
        .filter_map(|(label, url)| {
            url.as_ref().map(|url| FooterLink {
                label: label.to_string(),
                url: url.clone(),
            })
        })
        .collect()
    }
}

fn summarize(article: &NewsArticle, today: NaiveDate) -> ArticleSummary {
    ArticleSummary {
        title: article.title.clone(),
        category: article.sport_name().to_uppercase(),
        date: article
            .publish_date
            .map(|published| relative_age(published.date_naive(), today))
            .unwrap_or_default(),
        thumbnail: article.image_url.clone().unwrap_or_default(),
    }
}

/// Renders the newsletter email as HTML. All values are HTML-escaped.
///
/// # Errors
/// Returns an error if the template fails to render.
pub fn render_newsletter(email: &NewsletterEmail) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template(TEMPLATE_NAME, newsletter_template())
        .context("Failed to load newsletter template")?;

    env.get_template(TEMPLATE_NAME)
        .context("Failed to load newsletter template")?
        .render(context! {
            brand => BRAND,
            tagline => TAGLINE,
            packages_url => PACKAGES_URL,
            date => email.date,
            featured => email.featured,
            articles => email.articles,
            primary_color => email.theme.primary_color,
            secondary_color => email.theme.secondary_color,
            logo_url => email.theme.logo_url,
            footer_links => email.footer_links(),
            year => Utc::now().year(),
        })
        .context("Failed to render newsletter email")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewsletterEmail {
        NewsletterEmail {
            date: "FRIDAY, DECEMBER 20, 2025".into(),
            featured: Some(FeaturedArticle {
                category: "PREMIER LEAGUE".into(),
                title: "Diamond Suite opens".into(),
                excerpt: "Private chef & club legends".into(),
                link: "https://obsidian.lifestyle/news/1".into(),
                thumbnail: String::new(),
            }),
            articles: vec![ArticleSummary {
                title: "Monaco GP yacht packages".into(),
                category: "FORMULA 1".into(),
                date: "2 DAYS AGO".into(),
                thumbnail: "/f1.jpg".into(),
            }],
            unsubscribe_url: Some("https://obsidian.lifestyle/unsubscribe".into()),
            ..NewsletterEmail::default()
        }
    }

    #[test]
    fn test_renders_sections() {
        let html = render_newsletter(&sample()).unwrap();
        assert!(html.contains("WEEKLY EDITION &bull; FRIDAY, DECEMBER 20, 2025"));
        assert!(html.contains("Featured This Week"));
        assert!(html.contains("Monaco GP yacht packages"));
        assert!(html.contains("FORMULA 1 &bull; 2 DAYS AGO"));
        assert!(html.contains("#fbbf24"));
        assert!(html.contains(">Unsubscribe</a>"));
        assert!(!html.contains("View Online"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut email = sample();
        email.articles[0].title = "<script>alert(1)</script>".into();
        let html = render_newsletter(&email).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Private chef &amp; club legends"));
    }

    #[test]
    fn test_empty_edition_omits_sections() {
        let html = render_newsletter(&NewsletterEmail {
            date: "MONDAY, JANUARY 6, 2025".into(),
            ..NewsletterEmail::default()
        })
        .unwrap();
        assert!(!html.contains("Featured This Week"));
        assert!(!html.contains("Latest Premium Stories"));
    }

    #[test]
    fn test_edition_date_and_age() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 19).unwrap();
        assert_eq!(edition_date(date), "FRIDAY, DECEMBER 19, 2025");

        let today = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        assert_eq!(relative_age(date, today), "2 DAYS AGO");
        assert_eq!(relative_age(today, today), "TODAY");
    }
}
