//! Reefwarden CLI - habitat restoration and quiz engine.
//!
//! Commands are written to stdout as JSON lines; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reefwarden_core::{Command, GameConfig, PlayerId, Roster, WorldEvent};
use reefwarden_progress::{provision_player, PlayerProfile, ProgressSync, RemoteHandle};
use reefwarden_router::{CommandSink, InteractionRouter};
use reefwarden_storage::JsonFileStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reefwarden")]
#[command(about = "Habitat restoration and quiz engine", long_about = None)]
struct Cli {
    /// JSON file backing the progress store
    #[arg(long, global = true, default_value = "reefwarden.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a player's progress tree
    Provision {
        /// Player id
        uid: String,
        /// Display name
        #[arg(long)]
        username: String,
        /// Contact address
        #[arg(long)]
        email: String,
        /// Take the habitat/subject roster from this game config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay a script of world events through the engine
    Play {
        /// Game config
        config: PathBuf,
        /// Event script (JSON array)
        script: PathBuf,
        /// Player id; without it no progress is read or written
        #[arg(long)]
        uid: Option<String>,
    },
    /// Show a player's quiz progress
    Show {
        /// Player id
        uid: String,
    },
    /// Check a game config
    Validate {
        /// Game config
        config: PathBuf,
    },
}

/// Prints each command as one JSON line.
struct JsonLinesSink;

impl CommandSink for JsonLinesSink {
    fn emit(&mut self, command: Command) {
        match serde_json::to_string(&command) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Could not encode {:?}: {}", command, e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Provision { uid, username, email, config } => {
            let roster = match config {
                Some(path) => load_config(&path)?.roster(),
                None => Roster::default(),
            };
            let handle = open_handle(&cli.store, &uid).await?;
            let profile = PlayerProfile { username, email };
            provision_player(&handle, &profile, &roster)
                .await
                .with_context(|| format!("provisioning {}", uid))?;
            println!("Provisioned {} ({} quiz records)", uid, roster.pairs().count());
        }
        Commands::Play { config, script, uid } => {
            let config = load_config(&config)?;
            let handle = match uid {
                Some(uid) => open_handle(&cli.store, &uid).await?,
                None => {
                    info!("No player given; progress will not be read or written");
                    RemoteHandle::new()
                }
            };
            let events = load_script(&script)?;
            info!("Replaying {} events", events.len());

            let mut router = InteractionRouter::new(&config, handle, JsonLinesSink);
            router.run_script(events).await;
        }
        Commands::Show { uid } => {
            let handle = open_handle(&cli.store, &uid).await?;
            let records = ProgressSync::new(handle)
                .load_all()
                .await
                .with_context(|| format!("loading progress for {}", uid))?;

            println!("Progress for {} ({} records)", uid, records.len());
            for (habitat, subject, record) in records {
                println!(
                    "  {} / {} | {} pts | {:.1}s | {}",
                    habitat,
                    subject,
                    record.points_earned,
                    record.time_taken,
                    if record.is_completed { "COMPLETED" } else { "OPEN" },
                );
            }
        }
        Commands::Validate { config } => {
            let config = load_config(&config)?;
            println!("Config OK");
            println!("  Habitats: {}", config.habitats.len());
            println!("  Quizzes: {}", config.quizzes.len());
            println!("  Entities: {}", config.entities.iter().count());
            println!("  Markers: {}", config.markers.len());
            println!("  Commit strategy: {:?}", config.engine.commit_strategy);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    GameConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))
}

fn load_script(path: &Path) -> Result<Vec<WorldEvent>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing script {}", path.display()))
}

async fn open_handle(store: &Path, uid: &str) -> Result<RemoteHandle> {
    let store = JsonFileStore::open(store)
        .await
        .with_context(|| format!("opening store {}", store.display()))?;
    Ok(RemoteHandle::bound(PlayerId::new(uid), Arc::new(store)))
}
