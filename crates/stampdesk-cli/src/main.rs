//! # stampdesk CLI entry point
//!
//! Parses command-line arguments, builds the shared context and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use stampdesk_cli::auth::{run_login, run_logout, run_status, LoginArgs, StatusArgs};
use stampdesk_cli::console::run_console;
use stampdesk_cli::context::{AppContext, ContextOptions};
use stampdesk_cli::DEFAULT_STORE_PATH;

/// Loyalty stamp scanner for staff.
///
/// Log in once, then scan member codes and add or remove stamps. The live
/// service is configured with STAMPDESK_API_BASE_URL and
/// STAMPDESK_TIMEOUT_SECS; `--mock` runs against built-in demo data.
#[derive(Parser, Debug)]
#[command(name = "stampdesk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Stamp service base URL (overrides STAMPDESK_API_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// File the session token is saved to.
    #[arg(long, global = true, env = "STAMPDESK_STORE", default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Use the in-memory demo backend (staff@demo.test / staff123).
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and save the session token.
    Login(LoginArgs),

    /// Clear the saved session token.
    Logout,

    /// Show whether a saved session exists.
    Status(StatusArgs),

    /// Interactive scan console reading commands from stdin.
    Scan,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "stampdesk starting");

    let opts = ContextOptions {
        base_url: cli.base_url,
        store: cli.store,
        mock: cli.mock,
    };
    let ctx = match AppContext::build(&opts).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let mut stdout = std::io::stdout();
    let result = match cli.command {
        Commands::Login(args) => run_login(&ctx, &args, &mut stdout).await,
        Commands::Logout => run_logout(&ctx, &mut stdout).await,
        Commands::Status(args) => run_status(&ctx, &args, &mut stdout),
        Commands::Scan => run_console(&ctx.flow, BufReader::new(tokio::io::stdin()), &mut stdout)
            .await
            .map(|()| 0),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
