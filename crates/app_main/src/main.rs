//! iSlides gallery
//!
//! Interactive shell over the presentation gallery.

mod cli;
mod shell;

use anyhow::Result;
use app_core::{seed, GalleryConfig, ItemRegistry, JsonSnapshotGateway};
use clap::Parser;
use cli::Cli;
use shell::Shell;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GalleryConfig::load_from(path)?,
        None => GalleryConfig::load().unwrap_or_default(),
    };

    // Initialize logging and panic hook first
    let _guard = app_log::init(&app_log::LogSettings {
        level: cli.log_level(&config.logging.level),
        dir: app_log::log_dir(),
        retention_days: config.logging.retention_days,
    })?;

    tracing::info!("iSlides gallery starting...");

    let store = cli
        .store
        .as_ref()
        .map(|path| JsonSnapshotGateway::open(path.as_path()))
        .transpose()?;
    let registry = initial_registry(&cli, store.as_ref())?;

    let stdin = std::io::stdin();
    let mut shell = Shell::new(config, registry, stdin.lock(), std::io::stdout(), cli.yes);
    if let Some(store) = store {
        let stored = store.items();
        shell = shell.with_store(Box::new(store), stored)?;
    }

    shell.run()?;
    tracing::info!("iSlides gallery exiting");
    Ok(())
}

fn initial_registry(cli: &Cli, store: Option<&JsonSnapshotGateway>) -> Result<ItemRegistry> {
    if cli.empty {
        return Ok(ItemRegistry::new());
    }
    if let Some(path) = &cli.seed {
        return Ok(seed::load_seed(path)?);
    }
    match store.map(JsonSnapshotGateway::items) {
        Some(items) if !items.is_empty() => {
            tracing::info!("Resuming from {} stored item(s)", items.len());
            Ok(seed::registry_from_items(items)?)
        }
        _ => Ok(seed::sample_registry()?),
    }
}

