//! Line-oriented chat loop.
//!
//! Each input line is sent as a message and the reply's tokens are written
//! to the output as they arrive. Lines starting with `/` are commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::models::{SourceChunk, UploadFile, UploadResponse};
use crate::sse::StreamEvent;
use crate::state::{ChatSession, SendOutcome};
use crate::traits::HttpClient;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Quit,
    New,
    Attach(PathBuf),
    Message(String),
    Unknown(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        if !line.starts_with('/') {
            return ReplInput::Message(line.to_string());
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "/quit" | "/exit" => ReplInput::Quit,
            "/new" => ReplInput::New,
            "/attach" if !rest.is_empty() => ReplInput::Attach(PathBuf::from(rest)),
            _ => ReplInput::Unknown(command.to_string()),
        }
    }
}

/// Content type sent for a file, by extension.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Read a file from disk into an [`UploadFile`].
pub async fn read_upload(path: &Path) -> std::io::Result<UploadFile> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let file = UploadFile::new(filename, bytes);
    Ok(match guess_content_type(path) {
        Some(content_type) => file.with_content_type(content_type),
        None => file,
    })
}

/// Sources listing printed after a reply.
pub fn format_sources(sources: &[SourceChunk]) -> String {
    let mut out = String::from("Sources:\n");
    for (i, source) in sources.iter().enumerate() {
        match source.score {
            Some(score) => out.push_str(&format!("  [{}] {} ({:.2})\n", i + 1, source.label(), score)),
            None => out.push_str(&format!("  [{}] {}\n", i + 1, source.label())),
        }
    }
    out
}

/// Interactive chat over a [`ChatSession`].
pub struct Repl<H: HttpClient> {
    session: ChatSession<H>,
    /// Attachment ids sent with the next message
    pending: Vec<String>,
}

impl<H: HttpClient> Repl<H> {
    pub fn new(session: ChatSession<H>) -> Self {
        Self {
            session,
            pending: Vec::new(),
        }
    }

    pub fn session(&self) -> &ChatSession<H> {
        &self.session
    }

    pub fn pending_attachments(&self) -> &[String] {
        &self.pending
    }

    /// Upload `path` and queue it for the next message.
    pub async fn attach(&mut self, path: &Path) -> Result<UploadResponse> {
        let file = read_upload(path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let uploaded = self
            .session
            .upload(&file)
            .await
            .wrap_err_with(|| format!("Failed to upload {}", path.display()))?;
        info!(attachment_id = %uploaded.attachment_id, "Attachment queued");
        self.pending.push(uploaded.attachment_id.clone());
        Ok(uploaded)
    }

    /// Read lines from `input` until it ends or `/quit`.
    ///
    /// Replies go to `out`, errors and notices to `err`. A failed exchange
    /// is reported and the loop continues.
    pub async fn run<R, W, E>(&mut self, input: R, out: &mut W, err: &mut E) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
        E: Write,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match ReplInput::parse(&line) {
                ReplInput::Empty => continue,
                ReplInput::Quit => break,
                ReplInput::New => {
                    self.session.reset();
                    self.pending.clear();
                    writeln!(err, "Started a new conversation.")?;
                }
                ReplInput::Attach(path) => match self.attach(&path).await {
                    Ok(uploaded) => writeln!(
                        err,
                        "Attached {} ({})",
                        uploaded.filename, uploaded.attachment_id
                    )?,
                    Err(e) => writeln!(err, "error: {:#}", e)?,
                },
                ReplInput::Message(text) => self.send(&text, out, err).await?,
                ReplInput::Unknown(command) => writeln!(
                    err,
                    "unknown command {}; try /new, /attach PATH or /quit",
                    command
                )?,
            }
        }
        Ok(())
    }

    /// Send one message, streaming the reply to `out`.
    pub async fn send<W, E>(&mut self, text: &str, out: &mut W, err: &mut E) -> Result<()>
    where
        W: Write + Send,
        E: Write,
    {
        let attachment_ids = std::mem::take(&mut self.pending);
        let queued = attachment_ids.clone();
        let mut printed = false;
        let mut write_error: Option<std::io::Error> = None;

        let result = self
            .session
            .send_with(text, attachment_ids, |event| {
                if let StreamEvent::Token(token) = event {
                    if write_error.is_none() {
                        printed = true;
                        if let Err(e) = out.write_all(token.as_bytes()).and_then(|_| out.flush()) {
                            write_error = Some(e);
                        }
                    }
                }
            })
            .await;

        if let Some(e) = write_error {
            return Err(e.into());
        }
        if printed {
            writeln!(out)?;
        }

        match result {
            Ok(SendOutcome::Completed) => {
                let sources = self.session.store().read(|state| {
                    state
                        .last_assistant()
                        .and_then(|msg| msg.sources.clone())
                        .unwrap_or_default()
                });
                if !sources.is_empty() {
                    write!(out, "{}", format_sources(&sources))?;
                }
                out.flush()?;
            }
            Ok(SendOutcome::Rejected { message, .. }) => {
                writeln!(err, "error: {}", message)?;
            }
            Err(e) => {
                // No reply was stored, so the attachments go with the next message.
                self.pending = queued;
                writeln!(err, "error: {}", e.user_message())?;
            }
        }
        Ok(())
    }
}
