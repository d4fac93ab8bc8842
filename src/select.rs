//! Content selection: scoring strategies and the ordered fallback chain.
//!
//! A [`SelectionStrategy`] ranks corpus fragments against a query and keeps
//! at most `limit` of them. Strategies that depend on external services can
//! fail; the [`StrategyChain`] tries each configured strategy in order and
//! falls through on failure, ending at a first-K strategy that cannot fail.
//! Selection therefore never raises to the caller.

use async_trait::async_trait;

use crate::config::Config;
use crate::embedding;
use crate::error::Result;
use crate::models::ContentItem;

/// One selected fragment with the relevance score the strategy assigned it.
#[derive(Debug, Clone)]
pub struct ScoredItem {
    pub item: ContentItem,
    pub score: f64,
}

/// The winning strategy's name and its ranked picks for one query.
#[derive(Debug)]
pub struct Selection {
    pub strategy: &'static str,
    pub items: Vec<ScoredItem>,
}

impl Selection {
    /// The selected fragments in rank order, without scores.
    pub fn into_items(self) -> Vec<ContentItem> {
        self.items.into_iter().map(|s| s.item).collect()
    }
}

#[async_trait]
pub trait SelectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rank `corpus` against `query` and return at most `limit` items,
    /// highest relevance first. An empty corpus yields an empty selection.
    async fn select(
        &self,
        query: &str,
        corpus: &[ContentItem],
        limit: usize,
    ) -> Result<Vec<ScoredItem>>;
}

// ============ First-K ============

/// Identity policy: the first `limit` fragments in corpus order, unscored.
/// The chain's terminal strategy; cannot fail.
pub struct FirstK;

#[async_trait]
impl SelectionStrategy for FirstK {
    fn name(&self) -> &'static str {
        "first-k"
    }

    async fn select(
        &self,
        _query: &str,
        corpus: &[ContentItem],
        limit: usize,
    ) -> Result<Vec<ScoredItem>> {
        Ok(corpus
            .iter()
            .take(limit)
            .map(|item| ScoredItem {
                item: item.clone(),
                score: 0.0,
            })
            .collect())
    }
}

// ============ Keyword overlap ============

/// Case-insensitive query-word occurrence counting. Zero-score fragments
/// are dropped; ties keep corpus order.
pub struct KeywordOverlap;

impl KeywordOverlap {
    fn query_words(query: &str) -> Vec<String> {
        query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect()
    }

    fn score(words: &[String], text: &str) -> f64 {
        let haystack = text.to_lowercase();
        words
            .iter()
            .map(|w| haystack.matches(w.as_str()).count())
            .sum::<usize>() as f64
    }
}

#[async_trait]
impl SelectionStrategy for KeywordOverlap {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn select(
        &self,
        query: &str,
        corpus: &[ContentItem],
        limit: usize,
    ) -> Result<Vec<ScoredItem>> {
        let words = Self::query_words(query);

        let mut scored: Vec<ScoredItem> = corpus
            .iter()
            .map(|item| ScoredItem {
                item: item.clone(),
                score: Self::score(&words, &item.text),
            })
            .filter(|s| s.score > 0.0)
            .collect();

        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored)
    }
}

// ============ Embedding similarity ============

/// Hosted-embedding cosine similarity. Embeds the query and every fragment
/// per call; errors propagate so the chain can fall through.
pub struct EmbeddingSimilarity {
    config: crate::config::EmbeddingConfig,
}

impl EmbeddingSimilarity {
    pub fn new(config: crate::config::EmbeddingConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SelectionStrategy for EmbeddingSimilarity {
    fn name(&self) -> &'static str {
        "embedding"
    }

    async fn select(
        &self,
        query: &str,
        corpus: &[ContentItem],
        limit: usize,
    ) -> Result<Vec<ScoredItem>> {
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = embedding::embed_query(&self.config, query).await?;

        let texts: Vec<String> = corpus.iter().map(|item| item.text.clone()).collect();
        let vectors = embedding::embed_texts(&self.config, &texts).await?;

        let mut scored: Vec<ScoredItem> = corpus
            .iter()
            .zip(vectors.iter())
            .map(|(item, vec)| ScoredItem {
                item: item.clone(),
                score: embedding::cosine_similarity(&query_vec, vec) as f64,
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored)
    }
}

// ============ Strategy chain ============

/// Ranked list of strategies tried in order until one succeeds.
pub struct StrategyChain {
    strategies: Vec<Box<dyn SelectionStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn SelectionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the chain from config order, appending a terminal first-K
    /// strategy when the config does not list one.
    pub fn from_config(config: &Config) -> Self {
        let mut strategies: Vec<Box<dyn SelectionStrategy>> = Vec::new();
        for name in &config.retrieval.strategies {
            match name.as_str() {
                "keyword" => strategies.push(Box::new(KeywordOverlap)),
                "embedding" => {
                    strategies.push(Box::new(EmbeddingSimilarity::new(config.embedding.clone())))
                }
                "first-k" => strategies.push(Box::new(FirstK)),
                // load_config rejects anything else
                _ => {}
            }
        }
        if !config.retrieval.strategies.iter().any(|s| s == "first-k") {
            strategies.push(Box::new(FirstK));
        }
        Self::new(strategies)
    }

    /// Run the chain. Infallible: a strategy error is logged and the next
    /// strategy is tried; the terminal first-K safeguard always answers.
    pub async fn select(&self, query: &str, corpus: &[ContentItem], limit: usize) -> Selection {
        for strategy in &self.strategies {
            match strategy.select(query, corpus, limit).await {
                Ok(items) => {
                    return Selection {
                        strategy: strategy.name(),
                        items,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "selection strategy failed, falling through"
                    );
                }
            }
        }

        // Reached only if the chain was built without FirstK and every
        // strategy failed.
        Selection {
            strategy: "first-k",
            items: corpus
                .iter()
                .take(limit)
                .map(|item| ScoredItem {
                    item: item.clone(),
                    score: 0.0,
                })
                .collect(),
        }
    }
}
