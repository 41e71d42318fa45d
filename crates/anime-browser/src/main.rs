//! Anime browser CLI application.

use anime_browser::{view, AnimeStore, JikanClient, StateSnapshot};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{Config, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the top anime list
    Top {
        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search anime by title
    Search {
        /// Search keywords
        query: String,

        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show details for one anime by MAL ID
    Detail {
        /// MyAnimeList ID
        id: u32,
    },
    /// Show the featured strip of the home page
    Featured,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config =
        LogConfig::from_settings(&config.logging, &config.log_dir(), "anime-browser");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(
        config_file = %args.config.display(),
        base_url = %config.api.base_url,
        "Anime browser starting"
    );

    let client = Arc::new(JikanClient::new(&config.api).context("Failed to create Jikan client")?);

    let store = Arc::new(AnimeStore::new(client.clone()));
    let mut updates = store.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update();
            debug!(
                loading = state.loading,
                list = %state.list_status,
                detail = %state.detail_status,
                "State updated"
            );
        }
    });

    let state = match args.command {
        Command::Top { page } => {
            store.set_query("");
            store.go_to_page(page).await;
            let state = store.snapshot();
            print!("{}", view::render_list(&state));
            state
        }
        Command::Search { query, page } => {
            store.set_query(query);
            store.go_to_page(page).await;
            let state = store.snapshot();
            print!("{}", view::render_list(&state));
            state
        }
        Command::Detail { id } => {
            store.issue_detail(id).await;
            let state = store.snapshot();
            print!("{}", view::render_detail(&state));
            store.clear_detail();
            state
        }
        Command::Featured => {
            // The home strip degrades to empty instead of failing
            let items = match client.fetch_featured(config.browser.featured_count).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "Failed to load featured anime");
                    Vec::new()
                }
            };
            print!("{}", view::render_featured(&items));
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(exit_code(&state))
}

fn exit_code(state: &StateSnapshot) -> ExitCode {
    if state.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
