#![windows_subsystem = "windows"]

use anyhow::Result;
use wallet_shell::{config::Config, gui};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!("Using API at {}", config.api_root());
    gui::launch(config)?;

    Ok(())
}
