use anyhow::Result;
use tracing::info;

use sable_uci::UciEngine;

fn main() -> Result<()> {
    // stdout carries the UCI protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    info!("sable starting");
    UciEngine::default().run()?;
    Ok(())
}
