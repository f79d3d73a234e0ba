//! Command-line arguments.
//!
//! Every option can also be set through a `CELINE_*` environment variable.
//! A flag given on the command line wins over the environment, and both win
//! over the config file.
//!
//! ```bash
//! celine-chat --url https://assistant.example --top-k 8
//! CELINE_API_URL=https://assistant.example CELINE_TOP_K=8 celine-chat
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser};

use crate::config::validate_base_url;
use crate::state::PartialReplyPolicy;

/// Command-line interface.
#[derive(Debug, Clone, Parser)]
#[command(name = "celine-chat")]
#[command(about = "Chat with the Celine assistant")]
#[command(version)]
#[command(after_help = "In chat: /new starts a new conversation, /attach PATH uploads a file \
                        for the next message, /quit exits.")]
#[command(group(ArgGroup::new("mode").args(["health", "history", "attachments"])))]
pub struct Cli {
    /// Settings shared by every mode.
    #[command(flatten)]
    pub options: ChatOptions,

    /// Check the backend and exit.
    #[arg(long)]
    pub health: bool,

    /// Print a conversation's messages and exit.
    #[arg(long, value_name = "ID")]
    pub history: Option<String>,

    /// List your uploaded attachments and exit.
    #[arg(long)]
    pub attachments: bool,
}

/// Options shared by every command that talks to the backend.
#[derive(Debug, Clone, PartialEq, Default, Args)]
pub struct ChatOptions {
    /// Backend base URL.
    #[arg(long, env = "CELINE_API_URL", value_name = "URL", value_parser = parse_base_url)]
    pub url: Option<String>,

    /// Continue an existing conversation.
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Upload a file and attach it to the first message (repeatable).
    #[arg(id = "attach", long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,

    /// Ask for cited sources (`true`/`false`).
    #[arg(
        long,
        env = "CELINE_INCLUDE_CITATIONS",
        value_name = "BOOL",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub citations: Option<bool>,

    /// Do not request sources. Wins over `--citations`.
    #[arg(long)]
    pub no_citations: bool,

    /// Number of document chunks to retrieve.
    #[arg(long, env = "CELINE_TOP_K", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub top_k: Option<u32>,

    /// Connect timeout in seconds.
    #[arg(long, env = "CELINE_TIMEOUT_SECS", value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// What to do with a partial reply when the backend fails (`retain` or `discard`).
    #[arg(long, env = "CELINE_PARTIAL_REPLY", value_name = "POLICY")]
    pub partial_reply: Option<PartialReplyPolicy>,

    /// Read settings from this JSON file.
    #[arg(long, env = "CELINE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ChatOptions {
    /// Whether sources should be requested, if the command line says.
    pub fn include_citations(&self) -> Option<bool> {
        if self.no_citations {
            Some(false)
        } else {
            self.citations
        }
    }
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Check backend health
    Health(ChatOptions),
    /// Print the messages of a conversation
    History {
        conversation_id: String,
        options: ChatOptions,
    },
    /// List uploaded attachments
    Attachments(ChatOptions),
    /// Interactive chat (default)
    Chat(ChatOptions),
}

impl Cli {
    /// Resolve the selected mode.
    pub fn into_command(self) -> CliCommand {
        let Cli {
            options,
            health,
            history,
            attachments,
        } = self;

        match (health, history, attachments) {
            (true, _, _) => CliCommand::Health(options),
            (_, Some(conversation_id), _) => CliCommand::History {
                conversation_id,
                options,
            },
            (_, _, true) => CliCommand::Attachments(options),
            _ => CliCommand::Chat(options),
        }
    }
}

fn parse_base_url(value: &str) -> Result<String, String> {
    validate_base_url("--url", value).map_err(|e| e.to_string())
}
