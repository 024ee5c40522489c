//! Wallet CLI
//!
//! Command-line interface for Wallet - local-first storage of short
//! name/value records with best-effort sync to a remote document store.

use anyhow::Result;
use clap::{Parser, Subcommand};

use wallet_core::{Config, SyncCoordinator};

mod commands;
mod logging;
mod metadata;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "wallet")]
#[command(about = "Wallet - personal store of links, credentials, and notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Skip all remote calls for this invocation
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item
    Add {
        /// Value to store (URL, credential, note text)
        value: String,
        /// Display name (auto-generated for URLs if omitted)
        #[arg(short, long)]
        name: Option<String>,
        /// Category label
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List items
    #[command(alias = "ls")]
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show item details
    Show {
        /// Item id (full or prefix)
        id: String,
    },
    /// Edit an item
    Edit {
        /// Item id (full or prefix)
        id: String,
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
        /// New value
        #[arg(short, long)]
        value: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete an item
    #[command(alias = "rm")]
    Remove {
        /// Item id (full or prefix)
        id: String,
    },
    /// Open a URL item in the browser
    Open {
        /// Item id (full or prefix)
        id: String,
    },
    /// Show the local user fingerprint
    Id,
    /// Show status (storage, sync)
    Status,
    /// Push pending changes and refresh from the remote store
    Sync,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, project_id, api_key, base_url, log_file)
        key: String,
        /// Configuration value (empty clears optional keys)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the coordinator
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, &output)
            }
        };
    }

    let config = Config::load()?;
    logging::init(&config);

    let coordinator = SyncCoordinator::from_config(&config)?;
    if cli.offline {
        coordinator.set_online(false).await;
    }

    match cli.command {
        Commands::Add {
            value,
            name,
            category,
        } => commands::item::add(&coordinator, value, name, category, &output).await,
        Commands::List { category } => {
            commands::item::list(&coordinator, category, &output).await
        }
        Commands::Show { id } => commands::item::show(&coordinator, &id, &output).await,
        Commands::Edit {
            id,
            name,
            value,
            category,
        } => commands::item::edit(&coordinator, &id, name, value, category, &output).await,
        Commands::Remove { id } => commands::item::remove(&coordinator, &id, &output).await,
        Commands::Open { id } => commands::item::open(&coordinator, &id, &output).await,
        Commands::Id => commands::status::fingerprint(&coordinator, &output),
        Commands::Status => commands::status::show(&coordinator, &output),
        Commands::Sync => commands::sync::run(&coordinator, &output).await,
        Commands::Config { .. } => unreachable!(), // handled above
    }
}
