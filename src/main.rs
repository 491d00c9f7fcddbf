mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dayflow_core::config::DayflowConfig;
use dayflow_core::date_range::DateRange;
use dayflow_core::event::EventColor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::App;

#[derive(Parser)]
#[command(name = "dayflow")]
#[command(about = "Manage your DayFlow calendar and keep subscribed calendars in sync")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to a remote calendar (http, https or webcal URL)
    Subscribe {
        name: String,
        url: String,

        /// Palette color for the subscription (e.g. "teal", "deep-purple")
        #[arg(short, long, default_value = "blue")]
        color: String,

        /// Don't sync right after subscribing
        #[arg(long)]
        no_sync: bool,
    },
    /// Remove a subscription and all of its events
    Unsubscribe { id: i64 },
    /// Show a subscription's events again
    Enable { id: i64 },
    /// Hide a subscription's events without deleting them
    Disable { id: i64 },
    /// List subscriptions and their last sync status
    Subscriptions,
    /// Fetch subscribed calendars and replace their events
    Sync {
        /// Only sync this subscription
        #[arg(long)]
        id: Option<i64>,
    },
    /// List visible events by date range, day or search
    Events {
        /// Show events from this date (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["date", "search"])]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["date", "search"])]
        to: Option<String>,

        /// Show events on a single day (YYYY-MM-DD)
        #[arg(long, conflicts_with = "search")]
        date: Option<String>,

        /// Search titles, descriptions and locations
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Import events from an .ics file as local events
    Import { path: std::path::PathBuf },
    /// Export visible events to an .ics file
    Export {
        path: std::path::PathBuf,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },
    /// Check that a calendar URL is reachable
    CheckUrl { url: String },
    /// Show config and store paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = DayflowConfig::load()?;

    let filter = match cli.verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        1 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = App::open(config)?;

    match cli.command {
        Commands::Subscribe {
            name,
            url,
            color,
            no_sync,
        } => commands::subscribe::add(&app, &name, &url, EventColor::from_name(&color), !no_sync).await,
        Commands::Unsubscribe { id } => commands::subscribe::remove(&app, id).await,
        Commands::Enable { id } => commands::subscribe::set_enabled(&app, id, true),
        Commands::Disable { id } => commands::subscribe::set_enabled(&app, id, false),
        Commands::Subscriptions => commands::subscribe::list(&app),
        Commands::Sync { id } => commands::sync::run(&app, id).await,
        Commands::Events {
            from,
            to,
            date,
            search,
        } => {
            let query = match (date, search) {
                (_, Some(text)) => commands::events::Query::Search(text),
                (Some(day), None) => commands::events::Query::Day(
                    dayflow_core::date_range::parse_date(&day).map_err(|e| anyhow::anyhow!(e))?,
                ),
                (None, None) => commands::events::Query::Range(
                    DateRange::from_args(from.as_deref(), to.as_deref())
                        .map_err(|e| anyhow::anyhow!(e))?,
                ),
            };
            commands::events::run(&app, query)
        }
        Commands::Import { path } => commands::transfer::import(&app, &path),
        Commands::Export { path, from, to } => {
            let range = if from.is_some() || to.is_some() {
                Some(
                    DateRange::from_args(from.as_deref(), to.as_deref())
                        .map_err(|e| anyhow::anyhow!(e))?,
                )
            } else {
                None
            };
            commands::transfer::export(&app, &path, range)
        }
        Commands::CheckUrl { url } => commands::check_url::run(&app, &url).await,
        Commands::Config => commands::config::run(&app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_command_has_help_text() {
        let cli = Cli::command();
        for command in cli.get_subcommands() {
            assert!(
                command.get_about().is_some(),
                "`{}` has no help text",
                command.get_name()
            );
        }
    }
}
