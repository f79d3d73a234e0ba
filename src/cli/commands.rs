//! One-shot commands: `--health`, `--history`, `--attachments`.

use std::io::Write;

use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;

use crate::client::{AssistantClient, DEFAULT_ATTACHMENT_LIMIT};
use crate::models::{Attachment, MessageRole};
use crate::traits::HttpClient;

/// Print the backend health status. Fails if the backend is not healthy.
pub async fn handle_health_command<H, W>(client: &AssistantClient<H>, out: &mut W) -> Result<()>
where
    H: HttpClient,
    W: Write,
{
    let health = client
        .health_check()
        .await
        .wrap_err_with(|| format!("Health check against {} failed", client.base_url()))?;

    writeln!(out, "{}: {}", client.base_url(), health.status)?;
    if !health.is_ok() {
        bail!("Backend reported status '{}'", health.status);
    }
    Ok(())
}

/// Print the stored messages of a conversation.
pub async fn handle_history_command<H, W>(
    client: &AssistantClient<H>,
    conversation_id: &str,
    out: &mut W,
) -> Result<()>
where
    H: HttpClient,
    W: Write,
{
    let history = client
        .conversation_messages(conversation_id)
        .await
        .wrap_err_with(|| format!("Failed to load conversation {}", conversation_id))?;

    for message in &history.messages {
        let when = message
            .created_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(out, "{}", format_message_header(&message.role, &when))?;
        writeln!(out, "{}\n", message.content.trim_end())?;
    }
    if history.messages.is_empty() {
        writeln!(out, "(no messages)")?;
    }
    Ok(())
}

fn format_message_header(role: &MessageRole, when: &str) -> String {
    let who = match role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    };
    if when.is_empty() {
        format!("[{}]", who)
    } else {
        format!("[{}] {}", who, when)
    }
}

/// List the current user's attachments.
pub async fn handle_attachments_command<H, W>(client: &AssistantClient<H>, out: &mut W) -> Result<()>
where
    H: HttpClient,
    W: Write,
{
    let list = client
        .list_attachments(DEFAULT_ATTACHMENT_LIMIT)
        .await
        .wrap_err("Failed to list attachments")?;

    if list.items.is_empty() {
        writeln!(out, "(no attachments)")?;
    }
    for attachment in &list.items {
        writeln!(out, "{}", format_attachment(attachment))?;
    }
    Ok(())
}

/// One line of the attachment listing: id, name, size and caption.
pub fn format_attachment(attachment: &Attachment) -> String {
    let mut line = format!(
        "{}  {}  {}",
        attachment.id,
        attachment.filename,
        format_size(attachment.size_bytes)
    );
    if let Some(caption) = attachment.caption.as_deref().filter(|c| !c.is_empty()) {
        line.push_str("  ");
        line.push_str(caption);
    }
    line
}

/// Human readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::Response;
    use bytes::Bytes;

    fn client_returning(status: u16, body: &'static str) -> AssistantClient<MockHttpClient> {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::Success(Response::new(
            status,
            Bytes::from(body),
        )));
        AssistantClient::with_http("http://assistant.test", http)
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 1024 * 512), "5.5 MB");
    }

    #[tokio::test]
    async fn test_health_ok() {
        let client = client_returning(200, r#"{"status":"ok"}"#);
        let mut out = Vec::new();
        handle_health_command(&client, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "http://assistant.test: ok\n");
    }

    #[tokio::test]
    async fn test_health_degraded_fails() {
        let client = client_returning(200, r#"{"status":"degraded"}"#);
        let mut out = Vec::new();
        assert!(handle_health_command(&client, &mut out).await.is_err());
    }

    #[tokio::test]
    async fn test_history_printed() {
        let client = client_returning(
            200,
            r#"{"conversation_id":"c1","messages":[{"role":"user","content":"q?","created_at":1736956800},{"role":"assistant","content":"a.","created_at":1736956860}]}"#,
        );
        let mut out = Vec::new();
        handle_history_command(&client, "c1", &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[you] 2025-01-15 16:00\nq?\n\n[assistant] 2025-01-15 16:01\na.\n\n"
        );
    }

    #[tokio::test]
    async fn test_history_not_found() {
        let client = client_returning(404, r#"{"detail":"Conversation not found"}"#);
        let mut out = Vec::new();
        let err = handle_history_command(&client, "nope", &mut out)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Conversation not found"));
    }

    #[tokio::test]
    async fn test_attachments_listed() {
        let client = client_returning(
            200,
            r#"{"items":[{"id":"a1","scope":"user","uri":"s3://b/a1","path":"u/a1","filename":"plan.pdf","content_type":"application/pdf","size_bytes":2048,"caption":"Site plan","created_at":1736956800}],"limit":200}"#,
        );
        let mut out = Vec::new();
        handle_attachments_command(&client, &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a1  plan.pdf  2.0 KB  Site plan\n"
        );
        assert_eq!(
            client.http().get_requests()[0].url,
            "http://assistant.test/attachments?limit=200"
        );
    }

    #[tokio::test]
    async fn test_no_attachments() {
        let client = client_returning(200, r#"{"items":[],"limit":200}"#);
        let mut out = Vec::new();
        handle_attachments_command(&client, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no attachments)\n");
    }
}
