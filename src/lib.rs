//! # Gap Advisor
//!
//! A retrieval-grounded chat assistant for gap year program advising.
//!
//! The advisor answers prospective students' questions using content pulled
//! from program web pages, PDF brochures, local text files, and inline
//! config blocks. Each turn runs a fixed pipeline: select relevant corpus
//! fragments, assemble a size-bounded prompt, call the hosted completion
//! endpoint, and append the exchange to the conversation store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌──────────┐   ┌────────────┐
//! │ Sources       │──▶│  Corpus   │──▶│ Selector │──▶│  Prompt     │
//! │ web/pdf/fs/   │   │ (cached)  │   │  chain   │   │  assembler  │
//! │ inline        │   └───────────┘   └──────────┘   └─────┬──────┘
//! └──────────────┘                                         ▼
//!                     ┌──────────────┐              ┌────────────┐
//!                     │ Conversation │◀─────────────│ Completion  │
//!                     │    store     │    reply     │   client    │
//!                     └──────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Core data types |
//! | [`chunk`] | Fragmenting of source bodies |
//! | [`source_web`] | HTTP page and PDF sources |
//! | [`source_fs`] | Local file source |
//! | [`corpus`] | Corpus assembly and lazy cache |
//! | [`select`] | Selection strategies and fallback chain |
//! | [`embedding`] | Hosted embedding client |
//! | [`prompt`] | Structured prompt assembly |
//! | [`completion`] | Completion client |
//! | [`session`] | Conversation store and turn pipeline |
//! | [`chat`] | REPL and one-shot ask |
//! | [`search`] | Selector diagnostics command |
//! | [`sources`] | Source health command |

pub mod chat;
pub mod chunk;
pub mod completion;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod models;
pub mod prompt;
pub mod search;
pub mod select;
pub mod session;
pub mod source_fs;
pub mod source_web;
pub mod sources;
