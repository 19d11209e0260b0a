//! openmic - Karaoke party queue server - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use openmic::api::AppContext;
use openmic::commentary::Announcer;
use openmic::config::Config;
use openmic::events::EventBus;
use openmic::party::Party;
use openmic::store::{spawn_autosaver, JsonStore, PersistedParty};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for openmic
#[derive(Parser, Debug)]
#[command(name = "openmic")]
#[command(about = "Karaoke party queue server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "OPENMIC_PORT")]
    port: Option<u16>,

    /// Party state file (JSON)
    #[arg(short, long, env = "OPENMIC_DATA_FILE")]
    data_file: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, env = "OPENMIC_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openmic=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::resolve(args.port, args.data_file.as_deref(), args.config.as_deref())
        .context("Failed to resolve configuration")?;

    info!(
        "Starting openmic v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        config.port
    );
    info!("Party file: {}", config.data_file.display());

    // Load the previous party or start a fresh one. A corrupt file is
    // logged and set aside rather than taking the party down.
    let store = JsonStore::new(&config.data_file);
    let party = match store.load().await {
        Ok(Some(data)) => {
            info!(
                guests = data.guests.len(),
                songs = data.songs.len(),
                "party state loaded"
            );
            data.into_party()
        }
        Ok(None) => {
            info!("no party file yet, starting fresh");
            Party::new()
        }
        Err(e) => {
            warn!(error = %e, "could not read party file, starting fresh");
            Party::new()
        }
    };

    let party = Arc::new(Mutex::new(party));
    let saver = spawn_autosaver(Arc::clone(&party), store.clone());
    let announcer = Arc::new(Announcer::from_config(&config.commentary));

    let ctx = AppContext {
        party: Arc::clone(&party),
        events: EventBus::new(256),
        announcer,
        saver,
        config: Arc::new(config),
    };

    openmic::api::server::run(ctx).await?;

    // Graceful shutdown: one last save so nothing sung tonight is lost
    info!("Saving party state before exit");
    let snapshot = PersistedParty::from(&*party.lock().await);
    if let Err(e) = store.save(&snapshot).await {
        warn!(error = %e, "final save failed");
    }

    info!("Server shutdown complete");
    Ok(())
}
