//! `advisor search` — run the selection pipeline without a completion call.
//!
//! Diagnostic surface for checking what context a question would pull in.

use anyhow::Result;

use crate::config::Config;
use crate::corpus::CorpusCache;
use crate::select::StrategyChain;

pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let mut cache = CorpusCache::new();
    let corpus = cache.get_or_load(config).await;

    let chain = StrategyChain::from_config(config);
    let limit = limit.unwrap_or(config.retrieval.limit);
    let selection = chain.select(query, corpus.items(), limit).await;

    if selection.items.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("strategy: {}", selection.strategy);
    for (i, scored) in selection.items.iter().enumerate() {
        let excerpt: String = scored.item.text.chars().take(120).collect();
        println!(
            "{}. [{:.3}] {}",
            i + 1,
            scored.score,
            scored.item.source
        );
        println!("    excerpt: \"{}\"", excerpt.replace('\n', " "));
    }

    Ok(())
}
