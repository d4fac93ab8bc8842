//! `advisor sources` — list configured content sources and their health.

use anyhow::Result;

use crate::config::Config;
use crate::corpus;

pub async fn run_sources(config: &Config) -> Result<()> {
    let (loaded, statuses) = corpus::load(config).await;

    if statuses.is_empty() {
        println!("No sources configured; the fallback text block will be used.");
        return Ok(());
    }

    println!("{:<8} {:<48} STATUS", "KIND", "SOURCE");
    for status in &statuses {
        let display = match &status.outcome {
            Ok(n) => format!("OK ({} fragments)", n),
            Err(e) => format!("FAILED: {}", e),
        };
        println!("{:<8} {:<48} {}", status.kind, status.name, display);
    }

    println!("\n{} fragments loaded in total.", loaded.len());

    Ok(())
}
