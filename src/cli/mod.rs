//! Command-line front end.
//!
//! `main` parses the arguments into a [`Cli`] and hands the selected
//! [`CliCommand`] to [`run`], which resolves configuration, builds the
//! client and dispatches to the matching command.

pub mod args;
pub mod commands;
pub mod repl;

pub use args::{ChatOptions, Cli, CliCommand};
pub use commands::{handle_attachments_command, handle_health_command, handle_history_command};
pub use repl::{Repl, ReplInput};

use std::time::Duration;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio::io::BufReader;
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::client::AssistantClient;
use crate::config::ClientConfig;
use crate::state::ChatSession;

/// Configuration for `options`: the config file, then flags and their
/// environment variables.
pub fn resolve_config(options: &ChatOptions) -> Result<ClientConfig> {
    let config = ClientConfig::load(options.config.as_deref()).wrap_err("Invalid configuration")?;
    Ok(apply_options(config, options))
}

/// Overlay command-line flags on a loaded configuration.
pub fn apply_options(mut config: ClientConfig, options: &ChatOptions) -> ClientConfig {
    if let Some(url) = &options.url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(top_k) = options.top_k {
        config = config.with_top_k(top_k);
    }
    if let Some(include) = options.include_citations() {
        config = config.with_include_citations(include);
    }
    if let Some(secs) = options.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    if let Some(policy) = options.partial_reply {
        config = config.with_partial_reply_policy(policy);
    }
    config
}

/// Production client for `config`.
pub fn build_client(config: &ClientConfig) -> Result<AssistantClient<ReqwestHttpClient>> {
    let http = ReqwestHttpClient::with_connect_timeout(config.request_timeout)
        .wrap_err("Failed to build HTTP client")?;
    Ok(AssistantClient::with_http(config.base_url.as_str(), http))
}

/// Execute a parsed command.
pub async fn run(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Health(options) => {
            let client = build_client(&resolve_config(&options)?)?;
            handle_health_command(&client, &mut std::io::stdout()).await
        }
        CliCommand::History {
            conversation_id,
            options,
        } => {
            let client = build_client(&resolve_config(&options)?)?;
            handle_history_command(&client, &conversation_id, &mut std::io::stdout()).await
        }
        CliCommand::Attachments(options) => {
            let client = build_client(&resolve_config(&options)?)?;
            handle_attachments_command(&client, &mut std::io::stdout()).await
        }
        CliCommand::Chat(options) => run_chat(options).await,
    }
}

async fn run_chat(options: ChatOptions) -> Result<()> {
    let config = resolve_config(&options)?;
    debug!(base_url = %config.base_url, top_k = config.top_k, "Starting chat");

    let session = ChatSession::from_config(build_client(&config)?, &config);
    if let Some(conversation_id) = &options.conversation {
        session.continue_conversation(conversation_id.as_str());
    }

    let mut repl = Repl::new(session);
    for path in &options.attachments {
        let uploaded = repl.attach(path).await?;
        eprintln!("Attached {} ({})", uploaded.filename, uploaded.attachment_id);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    repl.run(stdin, &mut std::io::stdout(), &mut std::io::stderr())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PartialReplyPolicy;

    #[test]
    fn test_flags_override_config() {
        let config = ClientConfig::new()
            .with_base_url("http://from-file:8000")
            .with_top_k(3)
            .with_partial_reply_policy(PartialReplyPolicy::Discard);
        let options = ChatOptions {
            url: Some("https://from-flag.example/".to_string()),
            top_k: Some(9),
            no_citations: true,
            ..ChatOptions::default()
        };

        let merged = apply_options(config, &options);
        assert_eq!(merged.base_url, "https://from-flag.example");
        assert_eq!(merged.top_k, 9);
        assert!(!merged.include_citations);
        assert_eq!(merged.partial_reply_policy, PartialReplyPolicy::Discard);
    }

    #[test]
    fn test_timeout_and_policy_flags() {
        let options = ChatOptions {
            citations: Some(false),
            timeout_secs: Some(5),
            partial_reply: Some(PartialReplyPolicy::Discard),
            ..ChatOptions::default()
        };

        let merged = apply_options(ClientConfig::new(), &options);
        assert!(!merged.include_citations);
        assert_eq!(merged.request_timeout, Duration::from_secs(5));
        assert_eq!(merged.partial_reply_policy, PartialReplyPolicy::Discard);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let config = ClientConfig::new().with_top_k(4);
        let merged = apply_options(config.clone(), &ChatOptions::default());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_build_client_uses_base_url() {
        let config = ClientConfig::new()
            .with_base_url("http://assistant.test")
            .with_request_timeout(Duration::from_secs(5));
        let client = build_client(&config).unwrap();
        assert_eq!(client.base_url(), "http://assistant.test");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let options = ChatOptions {
            config: Some("/nonexistent/celine-chat/config.json".into()),
            ..ChatOptions::default()
        };
        assert!(resolve_config(&options).is_err());
    }
}
