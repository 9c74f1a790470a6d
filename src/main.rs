//! url-mapper command line.
//!
//! ```text
//!   CLI args + optional TOML config
//!       → storage (memory or JSON file)
//!       → MappingRegistry
//!       → command: set / remove / lookup / check / list / count / sync / watch
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::{Parser, Subcommand};

use url_mapper::config::watcher::ConfigWatcher;
use url_mapper::config::{load_config, MapperConfig, StorageBackend};
use url_mapper::observability::{logging, metrics};
use url_mapper::{storage, sync, MappingRegistry};

#[derive(Parser)]
#[command(name = "url-mapper")]
#[command(about = "Manage and resolve URL rewrite mappings", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON mapping store; overrides the configured storage.
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or replace a mapping
    Set {
        pattern: String,
        destination: String,
        /// Destination is a remote URL rather than a local path
        #[arg(long)]
        remote: bool,
        /// Store the mapping disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Remove the mapping stored under exactly this pattern
    Remove { pattern: String },
    /// Print the most specific mapping for a URL
    Lookup { url: String },
    /// Report whether a URL is mapped and whether that mapping is active
    Check { url: String },
    /// List every mapping
    List,
    /// Print the number of mappings
    Count,
    /// Apply the mappings declared in the config file
    Sync,
    /// Sync, then re-sync whenever the config file changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MapperConfig::default(),
    };
    if let Some(path) = &cli.store {
        config.storage.backend = StorageBackend::File;
        config.storage.path = Some(path.display().to_string());
    }

    logging::init_logging(&config.observability)?;

    let store = storage::open(&config.storage).await?;
    let registry = MappingRegistry::new(store);

    match cli.command {
        Commands::Set { pattern, destination, remote, inactive } => {
            let stored = registry.upsert(&pattern, &destination, !remote, !inactive).await?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Commands::Remove { pattern } => {
            if registry.remove(&pattern).await? {
                println!("removed");
            } else {
                println!("not found");
            }
        }
        Commands::Lookup { url } => match registry.lookup(&url).await? {
            Some(mapping) => println!("{}", serde_json::to_string_pretty(&mapping)?),
            None => println!("no match"),
        },
        Commands::Check { url } => {
            let mapped = registry.is_mapped(&url).await?;
            let active = registry.is_actively_mapped(&url).await?;
            println!("mapped={} active={}", mapped, active);
        }
        Commands::List => {
            let mappings = registry.list_mappings().await?;
            println!("{}", serde_json::to_string_pretty(&mappings)?);
        }
        Commands::Count => println!("{}", registry.count().await?),
        Commands::Sync => {
            let report = sync::apply(&registry, &config.mappings, &[]).await?;
            println!(
                "upserted={} unchanged={} removed={}",
                report.upserted, report.unchanged, report.removed
            );
        }
        Commands::Watch => {
            let path = cli.config.ok_or("watch requires --config")?;
            watch(registry, config, path).await?;
        }
    }

    Ok(())
}

async fn watch(
    registry: MappingRegistry,
    config: MapperConfig,
    path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        // Address already checked by config validation
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    registry.on_change(|| tracing::debug!("Mapping set changed"));

    sync::apply(&registry, &config.mappings, &[]).await?;
    let (watcher, mut updates) = ConfigWatcher::new(&path, config.clone());
    let current = ArcSwap::from_pointee(config);

    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(next) = updates.recv() => {
                let previous = current.load_full();
                if next.storage != previous.storage {
                    tracing::warn!("Storage settings changed; restart to apply them");
                }
                match sync::apply(&registry, &next.mappings, &previous.mappings).await {
                    Ok(_) => current.store(Arc::new(next)),
                    Err(e) => tracing::error!(error = %e, "Failed to apply reloaded mappings"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
