use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Fixed instruction block placed at the top of every prompt.
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Reply used when the completion service fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

fn default_instructions() -> String {
    "You are a friendly advisor for a gap year travel program. Answer \
     prospective students' questions using only the provided context. If the \
     context does not cover the question, say so and suggest speaking with a \
     program advisor."
        .to_string()
}

fn default_fallback_reply() -> String {
    "Sorry, I'm having trouble answering right now. Please try again in a \
     moment, or reach out to a program advisor directly."
        .to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            instructions: default_instructions(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt. 0 means single-attempt, fail-soft.
    #[serde(default)]
    pub max_retries: u32,
}

fn default_completion_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_output_tokens() -> u32 {
    512
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    /// Hard ceiling on the rendered prompt, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Number of trailing history turns rendered into the prompt.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_max_chars() -> usize {
    12_000
}
fn default_history_turns() -> usize {
    6
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            history_turns: default_history_turns(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Selection strategies tried in order; first success wins. A final
    /// `first-k` fallback is always appended if not listed.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,
    /// Maximum number of fragments selected per query.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Character budget for the context section of the prompt.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// Fragmenting budget for long source bodies, in characters.
    #[serde(default = "default_fragment_chars")]
    pub fragment_chars: usize,
}

fn default_strategies() -> Vec<String> {
    vec!["keyword".to_string()]
}
fn default_limit() -> usize {
    4
}
fn default_max_context_chars() -> usize {
    6_000
}
fn default_fragment_chars() -> usize {
    2_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            limit: default_limit(),
            max_context_chars: default_max_context_chars(),
            fragment_chars: default_fragment_chars(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_embedding_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_embedding_retries() -> u32 {
    2
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: default_embedding_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_embedding_retries(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    /// HTML pages fetched over HTTP and stripped to text.
    #[serde(default)]
    pub pages: Vec<String>,
    /// PDF documents fetched over HTTP and text-extracted.
    #[serde(default)]
    pub pdfs: Vec<String>,
    /// Local text/markdown files under a content directory.
    #[serde(default)]
    pub files: Option<FilesSourceConfig>,
    /// Literal text blocks embedded in the config.
    #[serde(default)]
    pub inline: Vec<InlineSource>,
    /// Used when every configured source fails to load.
    #[serde(default)]
    pub fallback_text: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesSourceConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct InlineSource {
    pub id: String,
    pub text: String,
}

impl Config {
    /// A default config with no sources, for tests and scaffolding commands.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.prompt.max_chars == 0 {
        anyhow::bail!("prompt.max_chars must be > 0");
    }
    if config.prompt.max_chars <= config.assistant.instructions.len() {
        anyhow::bail!("prompt.max_chars must exceed the instruction block length");
    }

    if config.retrieval.limit < 1 {
        anyhow::bail!("retrieval.limit must be >= 1");
    }
    if config.retrieval.fragment_chars == 0 {
        anyhow::bail!("retrieval.fragment_chars must be > 0");
    }
    for strategy in &config.retrieval.strategies {
        match strategy.as_str() {
            "first-k" | "keyword" | "embedding" => {}
            other => anyhow::bail!(
                "Unknown retrieval strategy: '{}'. Must be first-k, keyword, or embedding.",
                other
            ),
        }
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        anyhow::bail!("completion.temperature must be in [0.0, 2.0]");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.embedding.is_enabled() && config.embedding.model.is_none() {
        anyhow::bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }
    if config
        .retrieval
        .strategies
        .iter()
        .any(|s| s == "embedding")
        && !config.embedding.is_enabled()
    {
        anyhow::bail!("retrieval strategy 'embedding' requires [embedding] provider to be set");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let (_dir, path) = write_config("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.retrieval.limit, 4);
        assert_eq!(cfg.prompt.history_turns, 6);
        assert!(!cfg.embedding.is_enabled());
        assert!(cfg.sources.pages.is_empty());
    }

    #[test]
    fn rejects_unknown_strategy() {
        let (_dir, path) = write_config("[retrieval]\nstrategies = [\"semantic\"]\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn embedding_strategy_requires_provider() {
        let (_dir, path) = write_config("[retrieval]\nstrategies = [\"embedding\"]\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn embedding_provider_requires_model() {
        let (_dir, path) = write_config("[embedding]\nprovider = \"openai\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let (_dir, path) = write_config("[completion]\ntemperature = 3.5\n");
        assert!(load_config(&path).is_err());
    }
}
