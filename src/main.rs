use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod app;
mod config;
mod form;
mod generator;
mod model;
mod store;

use config::AppConfig;
use store::NameStore;

/// Desktop client for the hosted Irish names store.
#[derive(Debug, Parser)]
#[command(name = "irish_name_generator")]
struct Args {
    /// Alternate config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    info!("Starting irish_name_generator");

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_default()?,
    };
    config.apply_env();
    config.validate()?;

    let store = NameStore::new(&config.store)?;
    let handle = tokio::runtime::Handle::current();

    // The window runs on this thread; the probe and fetches run as tasks on
    // the runtime behind it.
    match app::run_app(store, handle) {
        Ok(_) => info!("window closed cleanly"),
        Err(e) => eprintln!("UI error: {:#?}", e),
    }

    Ok(())
}
