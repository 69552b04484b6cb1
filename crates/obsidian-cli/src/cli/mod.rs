//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use obsidian_core::admin::BulkAction;
use obsidian_core::dashboard::DEFAULT_ANALYTICS_DAYS;
use obsidian_core::forms::{ContactMethod, EventCategory};
use obsidian_core::newsletter::{DEFAULT_FIXTURE_DAYS, DEFAULT_NEWS_LIMIT};
use obsidian_core::{config, logging};
use uuid::Uuid;

mod app;
mod commands;

use app::App;

#[derive(Parser)]
#[command(name = "obsidian")]
#[command(version)]
#[command(about = "Obsidian VIP sports hospitality client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log to stderr instead of the log file
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(flatten)]
    Client(ClientCommands),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ClientCommands {
    /// Sign in to the admin dashboard
    Login {
        /// Admin username
        #[arg(value_name = "USERNAME")]
        username: String,

        /// Admin password
        #[arg(long, env = "OBSIDIAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored tokens
    Logout,
    /// Show the signed-in admin
    Whoami,

    /// Show dashboard analytics
    Dashboard {
        /// Window for subscriber growth, in days
        #[arg(long, default_value_t = DEFAULT_ANALYTICS_DAYS)]
        days: u32,
    },
    /// Manage subscribers
    Subscribers {
        #[command(subcommand)]
        command: SubscriberCommands,
    },
    /// Manage newsletter editions
    Newsletters {
        #[command(subcommand)]
        command: NewsletterCommands,
    },
    /// Manage scraped articles and fixtures
    Content {
        #[command(subcommand)]
        command: ContentCommands,
    },
    /// Show or change admin settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Subscribe to the newsletter
    Subscribe {
        #[arg(value_name = "EMAIL")]
        email: String,
        #[arg(value_name = "NAME")]
        name: String,
        /// Sports to follow (repeatable)
        #[arg(long = "sport", value_name = "SPORT")]
        sports: Vec<String>,
    },
    /// Unsubscribe using the token from a newsletter footer
    Unsubscribe {
        #[arg(value_name = "TOKEN")]
        token: String,
    },
    /// Show or update a subscriber's preferences
    Preferences {
        #[arg(value_name = "TOKEN")]
        token: String,
        /// Replace the followed sports (repeatable)
        #[arg(long = "sport", value_name = "SPORT")]
        sports: Vec<String>,
    },
    /// List available sports
    Sports,
    /// Latest news articles
    News {
        #[arg(long)]
        sport: Option<String>,
        #[arg(long, default_value_t = DEFAULT_NEWS_LIMIT)]
        limit: u32,
    },
    /// Upcoming fixtures
    Fixtures {
        #[arg(long)]
        sport: Option<String>,
        #[arg(long, default_value_t = DEFAULT_FIXTURE_DAYS)]
        days: u32,
    },
    /// Show the latest sent newsletter
    Latest,

    /// Send a contact enquiry
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        message: String,
        /// Event of interest
        #[arg(long, default_value = "")]
        event: String,
        #[arg(long)]
        guests: Option<u32>,
        /// Preferred contact method (email, phone)
        #[arg(long, default_value = "email")]
        method: ContactMethod,
    },
    /// Request an event booking
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Event title
        #[arg(long)]
        event: String,
        /// soccer, formula1, rugby, golf, tennis, boxing or concerts
        #[arg(long)]
        category: EventCategory,
        /// What you are looking for
        #[arg(long)]
        details: String,
        #[arg(long, default_value_t = 1)]
        guests: u32,
        /// Preferred date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        /// Favourite team, driver or artist
        #[arg(long, default_value = "")]
        favorite: String,
        #[arg(long, default_value = "")]
        requirements: String,
    },
    /// Request a callback
    Callback {
        #[arg(value_name = "PHONE")]
        phone: String,
        #[arg(long, default_value = "")]
        name: String,
        /// Preferred time (RFC 3339)
        #[arg(long)]
        at: Option<chrono::DateTime<chrono::Utc>>,
    },

    /// Manage cookie consent
    Consent {
        #[command(subcommand)]
        command: ConsentCommands,
    },
    /// Render a newsletter email as HTML
    Template {
        /// Newsletter id (admin); defaults to the latest public edition
        #[arg(long)]
        newsletter: Option<Uuid>,
        /// Public site origin used for links
        #[arg(long, default_value = "https://obsidian.lifestyle")]
        site_url: String,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<std::path::PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum SubscriberCommands {
    /// List subscribers
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<commands::subscribers::StatusArg>,
        #[arg(long)]
        sport: Option<String>,
    },
    /// Show one subscriber
    Show {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
    /// Change a subscriber's status
    Status {
        #[arg(value_name = "ID")]
        id: Uuid,
        #[arg(value_enum)]
        status: commands::subscribers::StatusArg,
    },
    /// Apply an action to several subscribers
    Bulk {
        /// activate, deactivate, unsubscribe or delete
        #[arg(value_name = "ACTION")]
        action: BulkAction,
        /// Subscriber ids, space or comma separated
        #[arg(value_name = "IDS", num_args = 1..)]
        ids: Vec<String>,
    },
    /// Delete a subscriber
    Delete {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
}

#[derive(clap::Subcommand)]
enum NewsletterCommands {
    /// List editions
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one edition
    Show {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
    /// Queue an edition for delivery
    Send {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
    /// Delivery statistics for an edition
    Report {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
    /// Delete an edition
    Delete {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
}

#[derive(clap::Subcommand)]
enum ContentCommands {
    /// List articles
    Articles {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sport: Option<String>,
        /// news, fixture, result or analysis
        #[arg(long = "type")]
        article_type: Option<String>,
    },
    /// List fixtures
    Fixtures {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sport: Option<String>,
    },
    /// Delete an article
    DeleteArticle {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
    /// Delete a fixture
    DeleteFixture {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
}

#[derive(clap::Subcommand)]
enum SettingsCommands {
    /// Print all settings as JSON
    Show,
    /// Update fields of one section
    Set {
        #[arg(value_enum)]
        section: commands::settings::SectionArg,
        /// Fields as key=value
        #[arg(value_name = "KEY=VALUE", num_args = 1..)]
        fields: Vec<String>,
    },
    /// Change the admin password
    Password {
        #[arg(long, env = "OBSIDIAN_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[derive(clap::Subcommand)]
enum ConsentCommands {
    /// Show the stored decision
    Show,
    /// Allow all cookie categories
    Accept,
    /// Allow essential cookies only
    Decline,
    /// Choose categories individually
    Select {
        #[arg(long)]
        analytics: bool,
        #[arg(long)]
        marketing: bool,
    },
    /// Forget the decision and stored preferences
    Reset,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Config { command } => return run_config(&command),
        Commands::Client(command) => command,
    };

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config, cli.verbose)?;

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(command, config).await })
}

fn run_config(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
    }
}

async fn dispatch(command: ClientCommands, config: config::Config) -> Result<()> {
    let app = App::open(config)?;

    match command {
        ClientCommands::Login { username, password } => {
            commands::auth::login(&app, &username, &password).await
        }
        ClientCommands::Logout => commands::auth::logout(&app).await,
        ClientCommands::Whoami => commands::auth::whoami(&app).await,

        ClientCommands::Dashboard { days } => commands::dashboard::show(&app, days).await,

        ClientCommands::Subscribers { command } => match command {
            SubscriberCommands::List {
                page,
                search,
                status,
                sport,
            } => commands::subscribers::list(&app, page, search, status, sport).await,
            SubscriberCommands::Show { id } => commands::subscribers::show(&app, id).await,
            SubscriberCommands::Status { id, status } => {
                commands::subscribers::change_status(&app, id, status).await
            }
            SubscriberCommands::Bulk { action, ids } => {
                commands::subscribers::bulk(&app, action, &ids).await
            }
            SubscriberCommands::Delete { id } => commands::subscribers::delete(&app, id).await,
        },

        ClientCommands::Newsletters { command } => match command {
            NewsletterCommands::List { page } => commands::newsletters::list(&app, page).await,
            NewsletterCommands::Show { id } => commands::newsletters::show(&app, id).await,
            NewsletterCommands::Send { id } => commands::newsletters::send(&app, id).await,
            NewsletterCommands::Report { id } => commands::newsletters::report(&app, id).await,
            NewsletterCommands::Delete { id } => commands::newsletters::delete(&app, id).await,
        },

        ClientCommands::Content { command } => match command {
            ContentCommands::Articles {
                page,
                search,
                sport,
                article_type,
            } => commands::content::articles(&app, page, search, sport, article_type).await,
            ContentCommands::Fixtures {
                page,
                search,
                sport,
            } => commands::content::fixtures(&app, page, search, sport).await,
            ContentCommands::DeleteArticle { id } => {
                commands::content::delete_article(&app, id).await
            }
            ContentCommands::DeleteFixture { id } => {
                commands::content::delete_fixture(&app, id).await
            }
        },

        ClientCommands::Settings { command } => match command {
            SettingsCommands::Show => commands::settings::show(&app).await,
            SettingsCommands::Set { section, fields } => {
                commands::settings::set(&app, section, &fields).await
            }
            SettingsCommands::Password {
                current,
                new,
                confirm,
            } => commands::settings::password(&app, current, new, confirm).await,
        },

        ClientCommands::Subscribe {
            email,
            name,
            sports,
        } => commands::public::subscribe(&app, &email, &name, sports).await,
        ClientCommands::Unsubscribe { token } => commands::public::unsubscribe(&app, &token).await,
        ClientCommands::Preferences { token, sports } => {
            commands::public::preferences(&app, &token, sports).await
        }
        ClientCommands::Sports => commands::public::sports(&app).await,
        ClientCommands::News { sport, limit } => {
            commands::public::news(&app, sport.as_deref(), limit).await
        }
        ClientCommands::Fixtures { sport, days } => {
            commands::public::fixtures(&app, sport.as_deref(), days).await
        }
        ClientCommands::Latest => commands::public::latest(&app).await,

        ClientCommands::Contact {
            name,
            email,
            phone,
            message,
            event,
            guests,
            method,
        } => {
            commands::forms::contact(
                &app,
                obsidian_core::forms::ContactForm {
                    name,
                    email,
                    phone,
                    event,
                    guests,
                    message,
                    contact_method: method,
                },
            )
            .await
        }
        ClientCommands::Book {
            name,
            email,
            phone,
            event,
            category,
            details,
            guests,
            date,
            favorite,
            requirements,
        } => {
            commands::forms::book(
                &app,
                obsidian_core::forms::BookingForm {
                    name,
                    email,
                    phone,
                    event_title: event,
                    event_category: category,
                    event_details: details,
                    favorite_entity: favorite,
                    number_of_guests: guests,
                    preferred_date: date,
                    special_requirements: requirements,
                },
            )
            .await
        }
        ClientCommands::Callback { phone, name, at } => {
            commands::forms::callback(
                &app,
                obsidian_core::forms::CallbackForm {
                    phone,
                    name,
                    preferred_time: at,
                },
            )
            .await
        }

        ClientCommands::Consent { command } => {
            let consent = app.consent();
            match command {
                ConsentCommands::Show => {
                    commands::consent::show(&consent);
                    Ok(())
                }
                ConsentCommands::Accept => commands::consent::accept(&consent),
                ConsentCommands::Decline => commands::consent::decline(&consent),
                ConsentCommands::Select {
                    analytics,
                    marketing,
                } => commands::consent::select(&consent, analytics, marketing),
                ConsentCommands::Reset => commands::consent::reset(&consent),
            }
        }
        ClientCommands::Template {
            newsletter,
            site_url,
            output,
        } => commands::template::render(&app, newsletter, &site_url, output.as_deref()).await,
    }
}
