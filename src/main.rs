//! # Drive Search CLI (`dsc`)
//!
//! Drives the client core from a terminal: boot probe, guarded screens and
//! the list / ingest / search workflows, against a configured backend.
//!
//! ## Usage
//!
//! ```bash
//! dsc --config ./config/dsc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dsc whoami` | Probe the backend for the current session |
//! | `dsc login-url` | Print the external sign-in URL |
//! | `dsc files` | List files shown on the dashboard |
//! | `dsc ingest` | List files, then ingest them for search |
//! | `dsc search "<query>"` | Semantic search over ingested files |
//! | `dsc logout` | End the session |
//!
//! The session credential comes from `backend.session_cookie` in the config
//! file. Commands for signed-in screens exit with status 1 when the backend
//! reports no session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use drive_search_client::app::{App, Screen};
use drive_search_client::backend::{Backend, HttpBackend};
use drive_search_client::config;
use drive_search_client::dashboard::{DashboardView, MessageKind};
use drive_search_client::logging;
use drive_search_client::search::SearchView;
use drive_search_client::workflow::TriggerOutcome;

/// Drive Search CLI: sign in, list, ingest and search your Drive text files.
#[derive(Parser)]
#[command(name = "dsc", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dsc.toml")]
    config: PathBuf,

    /// Log debug output for this crate to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in identity, if any.
    Whoami,

    /// Print the URL that starts external sign-in.
    LoginUrl,

    /// List text and markdown files on the dashboard.
    Files,

    /// List files, then process them for search.
    ///
    /// Ingestion is skipped when the listing fails or is empty.
    Ingest,

    /// Search processed files.
    Search {
        /// The search query string.
        query: String,
    },

    /// Sign out. The local session is cleared even if the backend is unreachable.
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let cfg = config::load_config(&cli.config)?;
    let backend: Arc<dyn Backend> =
        Arc::new(HttpBackend::new(&cfg.backend).context("Failed to set up backend client")?);

    let app = App::new(backend.clone());
    if !matches!(cli.command, Commands::LoginUrl) {
        app.boot().await;
    }

    match cli.command {
        Commands::Whoami => match app.session().state().identity() {
            Some(identity) => {
                println!("id:     {}", identity.id);
                println!("name:   {}", identity.name);
                println!("email:  {}", identity.email);
                if let Some(ref picture) = identity.profile_picture {
                    println!("avatar: {}", picture);
                }
            }
            None => println!("Not signed in."),
        },
        Commands::LoginUrl => println!("{}", backend.sign_in_url()),
        Commands::Files => {
            let dashboard = match app.open("/dashboard").await {
                Screen::Dashboard(d) => d,
                other => exit_not_signed_in(&other),
            };
            print_dashboard(&dashboard.view());
        }
        Commands::Ingest => {
            let dashboard = match app.open("/dashboard").await {
                Screen::Dashboard(d) => d,
                other => exit_not_signed_in(&other),
            };
            if dashboard.can_ingest() {
                dashboard.ingest().await;
            }
            let view = dashboard.view();
            print_dashboard(&view);
            if let Some(message) = &view.message {
                if message.kind == MessageKind::Failure {
                    std::process::exit(1);
                }
            }
        }
        Commands::Search { query } => {
            let screen = match app.open("/search").await {
                Screen::Search(s) => s,
                other => exit_not_signed_in(&other),
            };
            if let TriggerOutcome::Invalid(err) = screen.submit(&query).await {
                eprintln!("Error: {}", err);
                std::process::exit(2);
            }
            let view = screen.view(&query);
            print_search(&view, cfg.display.max_results);
            if view.error.is_some() {
                std::process::exit(1);
            }
        }
        Commands::Logout => {
            app.sign_out().await;
            println!("Signed out.");
        }
    }

    Ok(())
}

fn exit_not_signed_in(screen: &Screen) -> ! {
    match screen {
        Screen::SignIn(view) => {
            eprintln!("Not signed in. Sign in at: {}", view.sign_in_url);
        }
        _ => eprintln!("Not signed in."),
    }
    std::process::exit(1);
}

fn print_dashboard(view: &DashboardView) {
    if let Some(identity) = &view.identity {
        println!("{} <{}>", identity.name, identity.email);
        println!();
    }

    if let Some(message) = &view.message {
        println!("{}", message.text);
        println!();
    }

    println!("Your Text Files ({})", view.files.len());
    if let Some(notice) = view.empty_notice {
        println!("{}", notice);
        return;
    }
    println!("{:<40} {:<10} LINK", "FILE NAME", "TYPE");
    for row in &view.files {
        println!("{:<40} {:<10} {}", row.name, row.kind, row.link);
    }
}

fn print_search(view: &SearchView, max_results: usize) {
    if let Some(error) = view.error {
        eprintln!("{}", error);
    }
    if !view.has_searched {
        return;
    }

    println!("{}", view.heading);
    if let Some(notice) = view.empty_notice {
        println!("{}", notice);
        return;
    }
    for row in view.results.iter().take(max_results) {
        println!("{:>8}  {}", row.relevance, row.file_name);
        println!("          {}", row.link);
    }
}
