//! Conversation state and the per-turn pipeline.
//!
//! A [`Session`] owns the conversation store and drives each turn through
//! selection, prompt assembly, and the completion call. Turns are fail-soft:
//! a completion failure is logged and answered with the configured fallback
//! reply, so no error ever escapes the interactive loop.

use std::sync::Arc;
use uuid::Uuid;

use crate::completion::{CompletionBackend, CompletionRequest};
use crate::config::Config;
use crate::corpus::Corpus;
use crate::models::ConversationTurn;
use crate::prompt::Prompt;
use crate::select::StrategyChain;

/// Append-only ordered sequence of conversation turns.
///
/// `append` is the only mutator; reads return the full sequence or a
/// trailing slice for prompt assembly.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Vec<ConversationTurn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The last `n` turns in chronological order.
    pub fn last(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// What happened during one turn, for the diagnostics surface. The reply
/// itself is always user-safe; `error` carries the raw failure when the
/// fallback was used.
#[derive(Debug)]
pub struct TurnReport {
    pub reply: String,
    pub strategy: &'static str,
    pub selected: Vec<(String, f64)>,
    pub prompt_chars: usize,
    pub error: Option<String>,
}

/// One user's chat session: immutable corpus, strategy chain, completion
/// backend, and the growing conversation store.
pub struct Session {
    id: Uuid,
    config: Config,
    corpus: Arc<Corpus>,
    chain: StrategyChain,
    backend: Box<dyn CompletionBackend>,
    store: ConversationStore,
}

impl Session {
    pub fn new(config: Config, corpus: Arc<Corpus>, backend: Box<dyn CompletionBackend>) -> Self {
        let chain = StrategyChain::from_config(&config);
        Self {
            id: Uuid::new_v4(),
            config,
            corpus,
            chain,
            backend,
            store: ConversationStore::new(),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Process one user question end to end. Never fails; a completion
    /// error degrades to the configured fallback reply.
    pub async fn handle_turn(&mut self, question: &str) -> TurnReport {
        let selection = self
            .chain
            .select(question, self.corpus.items(), self.config.retrieval.limit)
            .await;

        let strategy = selection.strategy;
        let selected: Vec<(String, f64)> = selection
            .items
            .iter()
            .map(|s| (s.item.source.clone(), s.score))
            .collect();

        let context_items = selection.into_items();
        let prompt = Prompt::build(
            &self.config.assistant.instructions,
            &context_items,
            self.store.turns(),
            self.config.prompt.history_turns,
            self.config.retrieval.max_context_chars,
            question,
        )
        .render(self.config.prompt.max_chars);
        let prompt_chars = prompt.len();

        let request = CompletionRequest::from_config(&self.config.completion, prompt);

        let (reply, error) = match self.backend.complete(&request).await {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::error!(
                    session = %self.id,
                    strategy,
                    error = %e,
                    "completion failed, using fallback reply"
                );
                (self.config.assistant.fallback_reply.clone(), Some(e.to_string()))
            }
        };

        self.store.append(ConversationTurn::user(question));
        self.store.append(ConversationTurn::assistant(&reply));

        TurnReport {
            reply,
            strategy,
            selected,
            prompt_chars,
            error,
        }
    }
}
