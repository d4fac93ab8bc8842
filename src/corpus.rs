//! Corpus assembly and the lazily initialized content cache.
//!
//! Loading walks every configured source (pages, PDFs, local files, inline
//! blocks), fragments the bodies, and deduplicates identical fragments. A
//! failing source is logged and skipped; if every source fails, a static
//! fallback block keeps the assistant answerable.

use std::collections::HashSet;
use std::sync::Arc;

use crate::chunk::{fragment_body, fragment_hash};
use crate::config::Config;
use crate::models::ContentItem;
use crate::source_fs;
use crate::source_web;

/// Source label attached to the static fallback block.
pub const FALLBACK_SOURCE: &str = "fallback";

/// Used when no configured source yields any content.
const DEFAULT_FALLBACK_TEXT: &str = "General program information is temporarily \
unavailable. The gap year program offers semester and full-year travel \
experiences for students between high school and university. For current \
destinations, dates, and pricing, please speak with a program advisor.";

/// The full set of grounding fragments available to a session. Immutable
/// once loaded.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: Vec<ContentItem>,
}

impl Corpus {
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Outcome of loading one configured source: fragment count or the error
/// that caused it to be skipped.
#[derive(Debug)]
pub struct SourceStatus {
    pub kind: &'static str,
    pub name: String,
    pub outcome: Result<usize, String>,
}

/// Load every configured source into a corpus.
///
/// Never fails: each source error is recorded in its [`SourceStatus`] and
/// logged, and the corpus proceeds with whatever loaded. An all-failed (or
/// unconfigured) load substitutes the fallback text block.
pub async fn load(config: &Config) -> (Corpus, Vec<SourceStatus>) {
    let mut items: Vec<ContentItem> = Vec::new();
    let mut statuses: Vec<SourceStatus> = Vec::new();
    let max_chars = config.retrieval.fragment_chars;

    let client = match source_web::build_client(config.completion.timeout_secs) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client; skipping remote sources");
            None
        }
    };

    for url in &config.sources.pages {
        let outcome = match &client {
            Some(client) => match source_web::fetch_page(client, url).await {
                Ok(body) => {
                    let frags = fragment_body(url, &body, max_chars);
                    let n = frags.len();
                    items.extend(frags);
                    Ok(n)
                }
                Err(e) => Err(e.to_string()),
            },
            None => Err("no HTTP client".to_string()),
        };
        record(&mut statuses, "page", url.clone(), outcome);
    }

    for url in &config.sources.pdfs {
        let outcome = match &client {
            Some(client) => match source_web::fetch_pdf(client, url).await {
                Ok(body) => {
                    let frags = fragment_body(url, &body, max_chars);
                    let n = frags.len();
                    items.extend(frags);
                    Ok(n)
                }
                Err(e) => Err(e.to_string()),
            },
            None => Err("no HTTP client".to_string()),
        };
        record(&mut statuses, "pdf", url.clone(), outcome);
    }

    if let Some(files) = &config.sources.files {
        let name = files.root.display().to_string();
        let outcome = match source_fs::scan_files(files) {
            Ok(docs) => {
                let mut n = 0;
                for (path, body) in docs {
                    let frags = fragment_body(&path, &body, max_chars);
                    n += frags.len();
                    items.extend(frags);
                }
                Ok(n)
            }
            Err(e) => Err(e.to_string()),
        };
        record(&mut statuses, "files", name, outcome);
    }

    for block in &config.sources.inline {
        let frags = fragment_body(&block.id, &block.text, max_chars);
        let n = frags.len();
        items.extend(frags);
        record(&mut statuses, "inline", block.id.clone(), Ok(n));
    }

    let items = dedup(items);

    let corpus = if items.is_empty() {
        let text = config
            .sources
            .fallback_text
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK_TEXT.to_string());
        tracing::warn!("no source content loaded; using fallback text block");
        Corpus::from_items(vec![ContentItem::new(FALLBACK_SOURCE, text)])
    } else {
        Corpus::from_items(items)
    };

    (corpus, statuses)
}

fn record(
    statuses: &mut Vec<SourceStatus>,
    kind: &'static str,
    name: String,
    outcome: Result<usize, String>,
) {
    match &outcome {
        Ok(n) => tracing::info!(kind, source = %name, fragments = n, "source loaded"),
        Err(e) => tracing::warn!(kind, source = %name, error = %e, "source skipped"),
    }
    statuses.push(SourceStatus {
        kind,
        name,
        outcome,
    });
}

/// Drop fragments whose text is byte-identical to an earlier one, keeping
/// corpus order.
fn dedup(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(fragment_hash(&item.text)))
        .collect()
}

/// Lazily initialized, explicitly passed corpus cache.
///
/// The load runs at most once per cache; afterwards the corpus is shared
/// read-only. A plain check-then-set is enough because each session drives
/// its turns sequentially, and a repeated load would re-derive the same data.
#[derive(Debug, Default)]
pub struct CorpusCache {
    loaded: Option<Arc<Corpus>>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached corpus, loading it on first use.
    pub async fn get_or_load(&mut self, config: &Config) -> Arc<Corpus> {
        if let Some(corpus) = &self.loaded {
            return Arc::clone(corpus);
        }
        let (corpus, _statuses) = load(config).await;
        let corpus = Arc::new(corpus);
        self.loaded = Some(Arc::clone(&corpus));
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FilesSourceConfig, InlineSource};

    #[tokio::test]
    async fn inline_blocks_load_without_network() {
        let mut config = Config::minimal();
        config.sources.inline.push(InlineSource {
            id: "overview".to_string(),
            text: "Changemaker runs in Costa Rica.".to_string(),
        });

        let (corpus, statuses) = load(&config).await;
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.items()[0].source, "overview");
        assert!(statuses.iter().all(|s| s.outcome.is_ok()));
    }

    #[tokio::test]
    async fn all_sources_failed_substitutes_fallback() {
        let mut config = Config::minimal();
        config.sources.files = Some(FilesSourceConfig {
            root: std::path::PathBuf::from("/nonexistent/advisor-content"),
            include_globs: vec!["**/*.md".to_string()],
            exclude_globs: vec![],
        });

        let (corpus, statuses) = load(&config).await;
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.items()[0].source, FALLBACK_SOURCE);
        assert!(statuses.iter().any(|s| s.outcome.is_err()));
    }

    #[tokio::test]
    async fn configured_fallback_text_wins() {
        let mut config = Config::minimal();
        config.sources.fallback_text = Some("Custom fallback.".to_string());

        let (corpus, _) = load(&config).await;
        assert_eq!(corpus.items()[0].text, "Custom fallback.");
    }

    #[tokio::test]
    async fn duplicate_fragments_are_dropped() {
        let mut config = Config::minimal();
        for id in ["a", "b"] {
            config.sources.inline.push(InlineSource {
                id: id.to_string(),
                text: "Same text twice.".to_string(),
            });
        }

        let (corpus, _) = load(&config).await;
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.items()[0].source, "a");
    }

    #[tokio::test]
    async fn cache_loads_once() {
        let mut config = Config::minimal();
        config.sources.inline.push(InlineSource {
            id: "overview".to_string(),
            text: "Block.".to_string(),
        });

        let mut cache = CorpusCache::new();
        let first = cache.get_or_load(&config).await;

        // A config change after the first load must not trigger a reload.
        config.sources.inline.clear();
        let second = cache.get_or_load(&config).await;
        assert!(Arc::ptr_eq(&first, &second));
    }
}
