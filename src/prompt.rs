//! Structured prompt assembly with a single size-budget enforcement point.
//!
//! A [`Prompt`] holds its labeled sections (instructions, context, history,
//! question) as a value; text is produced only by [`Prompt::render`], which
//! owns the whole truncation policy: the context section is cut first (with
//! an ellipsis marker), then oldest history turns are dropped. The
//! instruction block and the question are never truncated.

use crate::models::{ContentItem, ConversationTurn};

const CONTEXT_HEADER: &str = "Context:";
const HISTORY_HEADER: &str = "Conversation so far:";
const QUESTION_PREFIX: &str = "Question: ";
const ELLIPSIS: &str = " ...";

/// An assembled prompt, kept structured until rendering.
#[derive(Debug, Clone)]
pub struct Prompt {
    instructions: String,
    context: String,
    history: Vec<String>,
    question: String,
}

impl Prompt {
    /// Assemble a prompt from the selected context, the trailing
    /// `history_turns` turns of conversation, and the new question.
    ///
    /// The context is pre-capped at `max_context_chars` here so selection
    /// mistakes cannot blow the budget before render gets to enforce it.
    pub fn build(
        instructions: &str,
        context_items: &[ContentItem],
        history: &[ConversationTurn],
        history_turns: usize,
        max_context_chars: usize,
        question: &str,
    ) -> Self {
        let joined = context_items
            .iter()
            .map(|item| format!("[{}]\n{}", item.source, item.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        let context = truncate_with_ellipsis(&joined, max_context_chars);

        let start = history.len().saturating_sub(history_turns);
        let history_lines: Vec<String> = history[start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.role.label(), turn.text))
            .collect();

        Self {
            instructions: instructions.to_string(),
            context,
            history: history_lines,
            question: question.to_string(),
        }
    }

    /// Render to a single string of at most `max_chars` characters.
    ///
    /// If the full prompt exceeds the ceiling, the context section is
    /// shrunk first (ellipsis-marked), then dropped, then history turns are
    /// dropped oldest-first. The result can exceed the ceiling only when
    /// the instructions and question alone already do.
    pub fn render(&self, max_chars: usize) -> String {
        let mut context = self.context.clone();
        let mut history = self.history.clone();

        loop {
            let rendered = compose(&self.instructions, &context, &history, &self.question);
            if rendered.len() <= max_chars {
                return rendered;
            }

            let overflow = rendered.len() - max_chars;
            if !context.is_empty() {
                let keep = context.len().saturating_sub(overflow);
                context = truncate_with_ellipsis(&context, keep);
                continue;
            }
            if !history.is_empty() {
                history.remove(0);
                continue;
            }

            // Instructions + question alone exceed the ceiling; emit them
            // untruncated.
            return rendered;
        }
    }
}

fn compose(instructions: &str, context: &str, history: &[String], question: &str) -> String {
    let mut parts: Vec<String> = vec![instructions.to_string()];

    if !context.is_empty() {
        parts.push(format!("{}\n{}", CONTEXT_HEADER, context));
    }
    if !history.is_empty() {
        parts.push(format!("{}\n{}", HISTORY_HEADER, history.join("\n")));
    }
    parts.push(format!("{}{}", QUESTION_PREFIX, question));

    parts.join("\n\n")
}

/// Truncate `s` to at most `max_chars` characters, marking the cut with an
/// ellipsis. Cuts fall on UTF-8 character boundaries.
fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return String::new();
    }

    let mut cut = max_chars - ELLIPSIS.len();
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &s[..cut], ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationTurn;

    const INSTRUCTIONS: &str = "Answer using only the context.";

    fn item(source: &str, text: &str) -> ContentItem {
        ContentItem::new(source, text)
    }

    #[test]
    fn contains_all_sections() {
        let context = vec![item("brochure", "Changemaker runs in Costa Rica.")];
        let history = vec![
            ConversationTurn::user("Hi"),
            ConversationTurn::assistant("Hello! How can I help?"),
        ];
        let prompt = Prompt::build(INSTRUCTIONS, &context, &history, 6, 6000, "Where is it?");
        let rendered = prompt.render(12_000);

        assert!(rendered.starts_with(INSTRUCTIONS));
        assert!(rendered.contains("Context:"));
        assert!(rendered.contains("[brochure]"));
        assert!(rendered.contains("User: Hi"));
        assert!(rendered.contains("Assistant: Hello! How can I help?"));
        assert!(rendered.ends_with("Question: Where is it?"));
    }

    #[test]
    fn empty_context_still_valid() {
        let prompt = Prompt::build(INSTRUCTIONS, &[], &[], 6, 6000, "anything");
        let rendered = prompt.render(12_000);
        assert!(rendered.starts_with(INSTRUCTIONS));
        assert!(!rendered.contains("Context:"));
        assert!(rendered.ends_with("Question: anything"));
    }

    #[test]
    fn history_keeps_only_trailing_turns() {
        let history: Vec<ConversationTurn> = (0..10)
            .map(|i| ConversationTurn::user(format!("turn {}", i)))
            .collect();
        let prompt = Prompt::build(INSTRUCTIONS, &[], &history, 4, 6000, "q");
        let rendered = prompt.render(12_000);
        assert!(!rendered.contains("turn 5"));
        assert!(rendered.contains("turn 6"));
        assert!(rendered.contains("turn 9"));
    }

    #[test]
    fn context_truncated_before_question() {
        let context = vec![item("big", &"lorem ipsum ".repeat(500))];
        let prompt = Prompt::build(INSTRUCTIONS, &context, &[], 6, 60_000, "the question");
        let rendered = prompt.render(300);

        assert!(rendered.len() <= 300);
        assert!(rendered.contains("..."));
        assert!(rendered.ends_with("Question: the question"));
        assert!(rendered.starts_with(INSTRUCTIONS));
    }

    #[test]
    fn history_dropped_oldest_first_when_context_gone() {
        let history: Vec<ConversationTurn> = (0..6)
            .map(|i| ConversationTurn::user(format!("message number {}", i)))
            .collect();
        let prompt = Prompt::build(INSTRUCTIONS, &[], &history, 6, 6000, "q");

        let full = prompt.render(100_000);
        let tight = prompt.render(INSTRUCTIONS.len() + 80);

        assert!(full.contains("message number 0"));
        assert!(tight.len() <= INSTRUCTIONS.len() + 80);
        if tight.contains("message number") {
            // Whatever survived must be the newest turns.
            assert!(tight.contains("message number 5"));
        }
        assert!(tight.ends_with("Question: q"));
    }

    #[test]
    fn ceiling_property_over_random_inputs() {
        // Deterministic xorshift; no external PRNG crate in the test stack.
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move |bound: usize| -> usize {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % bound as u64) as usize
        };

        for _ in 0..200 {
            let corpus: Vec<ContentItem> = (0..next(8))
                .map(|i| item(&format!("s{}", i), &"word ".repeat(next(300) + 1)))
                .collect();
            let history: Vec<ConversationTurn> = (0..next(10))
                .map(|i| ConversationTurn::user(format!("question number {}", i)))
                .collect();
            let question = "q".repeat(next(40) + 1);

            let prompt = Prompt::build(INSTRUCTIONS, &corpus, &history, 6, 2_000, &question);

            let floor = prompt.render(0).len(); // instructions + question only
            let ceiling = floor + next(500);
            let rendered = prompt.render(ceiling);

            assert!(
                rendered.len() <= ceiling,
                "rendered {} > ceiling {}",
                rendered.len(),
                ceiling
            );
        }
    }

    #[test]
    fn multibyte_context_truncates_on_char_boundary() {
        let context = vec![item("jp", &"日本語のテキスト。".repeat(100))];
        let prompt = Prompt::build(INSTRUCTIONS, &context, &[], 6, 60_000, "q");
        let rendered = prompt.render(200);
        assert!(rendered.len() <= 200);
        assert!(rendered.ends_with("Question: q"));
    }
}
