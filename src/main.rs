//! # Contact Link CLI (`clink`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clink init` | Create the SQLite database and schema |
//! | `clink serve` | Start the HTTP server |
//! | `clink interact` | Record an email/phone signal and print its identity |
//! | `clink details` | Show rows matching both an email and a phone |
//! | `clink get <id>` | Print one contact row |
//! | `clink stats` | Row counts and database size |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use contact_link::{commands, config, logging, migrate, server, stats};

/// Contact Link CLI — resolve email/phone signals into linked contact identities.
#[derive(Parser)]
#[command(
    name = "clink",
    about = "Contact Link — resolve email/phone signals into linked contact identities",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/contacts.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Record a contact signal, then print the identity it belongs to.
    ///
    /// At least one of `--email` / `--phone` is required.
    Interact {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Show the rows matching both an email and a phone number.
    Details {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Print a contact row by id.
    Get { id: i64 },

    /// Show contact counts and database size.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Interact { email, phone } => {
            commands::run_interact(&cfg, email.as_deref(), phone.as_deref()).await?;
        }
        Commands::Details { email, phone } => {
            commands::run_details(&cfg, email.as_deref(), phone.as_deref()).await?;
        }
        Commands::Get { id } => {
            commands::run_get(&cfg, id).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
