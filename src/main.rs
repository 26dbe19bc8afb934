use std::io;

use anyhow::Result;
use aspen_uci::UciEngine;
use tracing::{Level, info};

fn main() -> Result<()> {
    // stdout carries the UCI protocol.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::INFO)
        .init();
    info!("aspen starting");
    UciEngine::new().run()?;
    Ok(())
}
