//! # Gap Advisor CLI (`advisor`)
//!
//! ## Usage
//!
//! ```bash
//! advisor --config ./config/advisor.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `advisor chat` | Start the interactive chat loop |
//! | `advisor ask "<question>"` | Answer one question and exit |
//! | `advisor search "<query>"` | Show which fragments a question would select |
//! | `advisor sources` | List configured content sources and their health |
//!
//! The completion and embedding services require the `OPENAI_API_KEY`
//! environment variable; `chat` and `ask` refuse to start without it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gap_advisor::{chat, config, search, sources};

/// Gap Advisor — a retrieval-grounded chat assistant for gap year program
/// advising.
#[derive(Parser)]
#[command(
    name = "advisor",
    about = "Gap Advisor — a retrieval-grounded chat assistant for gap year program advising",
    version,
    long_about = "Gap Advisor answers prospective students' questions about a gap year travel \
    program. Answers are grounded in program web pages, PDF brochures, local text files, and \
    inline config blocks, selected per question by a configurable strategy chain."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/advisor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat loop.
    ///
    /// Reads questions from stdin until EOF or 'exit'. Requires
    /// OPENAI_API_KEY to be set.
    Chat {
        /// Print selection scores and raw completion errors to stderr.
        #[arg(long)]
        diagnostics: bool,
    },

    /// Answer a single question and exit.
    Ask {
        /// The question to answer.
        question: String,

        /// Print selection scores and raw completion errors to stderr.
        #[arg(long)]
        diagnostics: bool,
    },

    /// Run the selection pipeline and print ranked fragments.
    ///
    /// No completion call is made; useful for tuning sources and
    /// retrieval strategies.
    Search {
        /// The query to rank fragments against.
        query: String,

        /// Maximum number of fragments to show.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List configured content sources and whether they load.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Missing config file falls back to defaults plus the fallback text
    // block; a malformed file is still a hard error.
    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        tracing::warn!(path = %cli.config.display(), "config file not found, using defaults");
        config::Config::minimal()
    };

    match cli.command {
        Commands::Chat { diagnostics } => {
            chat::run_chat(&cfg, diagnostics).await?;
        }
        Commands::Ask {
            question,
            diagnostics,
        } => {
            chat::run_ask(&cfg, &question, diagnostics).await?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit).await?;
        }
        Commands::Sources => {
            sources::run_sources(&cfg).await?;
        }
    }

    Ok(())
}
