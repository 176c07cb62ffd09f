//! swapi-people CLI - Character records with vehicle and starship memberships

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swapi_people::config::{CONFIG_FILE, SwapiConfig};
use swapi_people::{CharacterPayload, CharacterStore, RelationKind, SqliteStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "swapi-people")]
#[command(version)]
#[command(about = "Manage characters and their vehicle/starship memberships")]
#[command(long_about = r#"
Stores characters in SQLite and keeps their vehicle and starship
memberships in sync with the lists you submit.

Example usage:
  swapi-people init
  swapi-people conveyance add --kind vehicles 14 Snowspeeder
  swapi-people add --data '{"name": "Luke Skywalker", "vehicles_id": ["14"]}'
  swapi-people update 1 --data '{"vehicles_id": []}'
  swapi-people get 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init {
        /// Also write a config file pointing at the database
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show one character, or all of them
    Get {
        /// Character ID
        id: Option<String>,
    },

    /// Create a character from a JSON payload
    Add {
        /// JSON object, or @path to a file containing one
        #[arg(long)]
        data: String,
    },

    /// Update a character from a JSON payload
    Update {
        /// Character ID
        id: String,

        /// JSON object, or @path to a file containing one
        #[arg(long)]
        data: String,
    },

    /// Delete a character and its memberships
    Delete {
        /// Character ID
        id: String,
    },

    /// Manage the vehicle and starship tables
    Conveyance {
        #[command(subcommand)]
        command: ConveyanceCommands,
    },
}

#[derive(Subcommand)]
enum ConveyanceCommands {
    /// Register a vehicle or starship
    Add {
        /// vehicles or starships
        #[arg(short, long)]
        kind: RelationKind,

        /// Conveyance ID
        id: String,

        /// Display name
        name: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let file_config = SwapiConfig::load(&config_path)?;
    let database = file_config.prepare_database(cli.database.as_deref())?;

    let store = SqliteStore::open(&database)?;
    let characters = CharacterStore::new();

    match cli.command {
        Commands::Init { write_config, force } => {
            tracing::info!("Initialized schema in {}", database.display());
            if write_config {
                let config = SwapiConfig {
                    database: Some(database.to_string_lossy().to_string()),
                };
                config.save(&config_path, force)?;
                tracing::info!("Wrote {}", config_path.display());
            }
        }

        Commands::Get { id } => {
            let found = characters.get(&store, id.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }

        Commands::Add { data } => {
            let payload = read_payload(&data)?;
            let created = characters.add(&store, &payload)?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }

        Commands::Update { id, data } => {
            let payload = read_payload(&data)?;
            let updated = characters.update(&store, &id, &payload)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }

        Commands::Delete { id } => {
            let deleted = characters.delete(&store, &id)?;
            println!("{}", serde_json::json!({ "id": deleted }));
        }

        Commands::Conveyance { command } => match command {
            ConveyanceCommands::Add { kind, id, name } => {
                store.insert_conveyance(kind, &id, name.as_deref())?;
                tracing::info!("Registered {} {}", kind, id);
            }
        },
    }

    Ok(())
}

/// Parse a payload given inline or as `@path`
fn read_payload(data: &str) -> anyhow::Result<CharacterPayload> {
    let json = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => data.to_string(),
    };
    Ok(serde_json::from_str(&json)?)
}
