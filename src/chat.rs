//! Interactive chat loop and one-shot ask.
//!
//! Both entry points perform the credential check up front: a missing API
//! key halts before any question is read, with guidance on how to fix it.
//! With `--diagnostics`, selection scores and raw completion errors go to
//! stderr; the chat surface itself only ever shows user-safe replies.

use anyhow::Result;
use std::io::Write;

use crate::completion::OpenAiCompletion;
use crate::config::Config;
use crate::corpus::CorpusCache;
use crate::session::{Session, TurnReport};

/// Run the interactive REPL until EOF or an exit command.
pub async fn run_chat(config: &Config, diagnostics: bool) -> Result<()> {
    let mut session = start_session(config).await?;

    println!("Gap year program advisor. Ask a question, or type 'exit' to quit.");

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        let report = session.handle_turn(question).await;
        if diagnostics {
            print_diagnostics(&report);
        }
        println!("advisor> {}\n", report.reply);
    }

    Ok(())
}

/// Answer a single question and exit.
pub async fn run_ask(config: &Config, question: &str, diagnostics: bool) -> Result<()> {
    let mut session = start_session(config).await?;

    let report = session.handle_turn(question).await;
    if diagnostics {
        print_diagnostics(&report);
    }
    println!("{}", report.reply);

    Ok(())
}

/// Credential check, corpus load, and session construction shared by both
/// entry points. The backend is built first so a configuration error stops
/// us before any content is fetched.
async fn start_session(config: &Config) -> Result<Session> {
    let backend = OpenAiCompletion::new(&config.completion)?;

    let mut cache = CorpusCache::new();
    let corpus = cache.get_or_load(config).await;
    tracing::info!(fragments = corpus.len(), "corpus ready");

    Ok(Session::new(config.clone(), corpus, Box::new(backend)))
}

fn print_diagnostics(report: &TurnReport) {
    eprintln!("-- strategy: {}", report.strategy);
    eprintln!("-- prompt: {} chars", report.prompt_chars);
    for (source, score) in &report.selected {
        eprintln!("--   [{:.3}] {}", score, source);
    }
    if let Some(error) = &report.error {
        eprintln!("-- completion error: {}", error);
    }
}
