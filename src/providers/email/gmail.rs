//! Gmail API adapter.
//!
//! Implements [`MailProvider`] against the Gmail REST API v1. The list
//! operation fetches message metadata, then pulls full details for each id
//! concurrently; a single failing detail fetch drops that message rather
//! than failing the batch. With no access token configured, or when the
//! API answers 401, the adapter serves the fixed demo inbox instead.
//!
//! # API Usage
//!
//! - `users.messages.list` + `users.messages.get` for fetching
//! - `users.messages.send` for sending (base64url `raw` payload)
//! - `users.messages.modify` for read-state changes

use async_trait::async_trait;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{demo, MailError, MailProvider, Result};
use crate::config::GmailSettings;
use crate::domain::{
    Address, EmailId, EmailMessage, MessageBatch, OutgoingMessage, ProviderKind, SendOutcome,
    ThreadId,
};

const GMAIL_API_BASE: &str = "https://www.googleapis.com/gmail/v1/users/me";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gmail message list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    messages: Option<Vec<MessageRef>>,
}

/// Minimal message reference from a list response.
#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

/// Gmail API message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    thread_id: Option<String>,
    label_ids: Option<Vec<String>>,
    snippet: Option<String>,
    payload: Option<GmailPayload>,
    internal_date: Option<String>,
}

/// Gmail message payload (headers and body parts).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPayload {
    headers: Option<Vec<GmailHeader>>,
    parts: Option<Vec<GmailPart>>,
    body: Option<GmailBody>,
    mime_type: Option<String>,
}

/// Gmail message header.
#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

/// Gmail message part (for multipart messages).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    mime_type: Option<String>,
    filename: Option<String>,
    body: Option<GmailBody>,
    parts: Option<Vec<GmailPart>>,
}

/// Gmail message body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailBody {
    data: Option<String>,
}

/// Gmail modify request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyRequest {
    remove_label_ids: Vec<String>,
}

/// Gmail send request body.
#[derive(Debug, Serialize)]
struct SendRequest {
    raw: String,
}

/// Gmail send response.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Gmail API error envelope.
#[derive(Debug, Deserialize)]
struct GmailErrorResponse {
    error: Option<GmailErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GmailErrorDetail {
    message: Option<String>,
}

/// Gmail API adapter.
///
/// Holds its credential for the lifetime of the instance; the settings are
/// resolved once at construction by the provider factory.
pub struct GmailProvider {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl GmailProvider {
    /// Creates an adapter from Gmail settings.
    pub fn new(settings: &GmailSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GMAIL_API_BASE.to_string(),
            access_token: settings
                .access_token
                .clone()
                .filter(|token| !token.is_empty()),
        }
    }

    /// Overrides the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the HTTP client (useful for custom proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Fetches full details for one message id.
    ///
    /// A failed fetch drops the message from the batch instead of failing
    /// the whole list operation.
    async fn fetch_detail(&self, token: &str, id: &str) -> Option<GmailMessage> {
        let url = format!("{}/messages/{}?format=full", self.base_url, id);

        let response = match self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(message_id = %id, %error, "dropping message, detail fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                message_id = %id,
                status = %response.status(),
                "dropping message, detail fetch returned error status"
            );
            return None;
        }

        match response.json::<GmailMessage>().await {
            Ok(message) => Some(message),
            Err(error) => {
                tracing::warn!(message_id = %id, %error, "dropping message, undecodable detail");
                None
            }
        }
    }

    /// Finds a header value by case-insensitive name.
    fn extract_header(payload: &GmailPayload, name: &str) -> Option<String> {
        payload.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|header| header.name.eq_ignore_ascii_case(name))
                .map(|header| header.value.clone())
        })
    }

    /// Parses an email address from a header value like "Name <email@example.com>".
    fn parse_address(value: &str) -> Address {
        let value = value.trim();
        match value.split_once('<').and_then(|(name, rest)| {
            rest.split_once('>').map(|(email, _)| (name, email))
        }) {
            Some((name, email)) => {
                let name = name.trim().trim_matches('"');
                Address {
                    email: email.trim().to_string(),
                    name: (!name.is_empty()).then(|| name.to_string()),
                }
            }
            None => Address::new(value),
        }
    }

    /// Decodes a base64url body chunk into text.
    fn decode_body(body: &GmailBody) -> Option<String> {
        let data = body.data.as_ref()?;
        let decoded = BASE64_URL_SAFE_NO_PAD.decode(data).ok()?;
        String::from_utf8(decoded).ok()
    }

    /// Recursively finds the first `text/plain` part.
    fn find_plain_text(parts: &[GmailPart]) -> Option<String> {
        for part in parts {
            if part.mime_type.as_deref() == Some("text/plain") {
                if let Some(text) = part.body.as_ref().and_then(Self::decode_body) {
                    return Some(text);
                }
            }
            if let Some(nested) = &part.parts {
                if let Some(text) = Self::find_plain_text(nested) {
                    return Some(text);
                }
            }
        }
        None
    }

    /// Best-effort plain-text extraction from a message payload, with
    /// line endings normalized to `\n`.
    fn extract_plain_text(payload: &GmailPayload) -> Option<String> {
        let direct = if payload.mime_type.as_deref() == Some("text/plain") {
            payload.body.as_ref().and_then(Self::decode_body)
        } else {
            None
        };
        direct
            .or_else(|| payload.parts.as_deref().and_then(Self::find_plain_text))
            .map(|text| text.replace("\r\n", "\n"))
    }

    /// Recursively checks whether any part carries an attachment filename.
    fn parts_have_attachments(parts: &[GmailPart]) -> bool {
        parts.iter().any(|part| {
            part.filename.as_deref().is_some_and(|f| !f.is_empty())
                || part
                    .parts
                    .as_deref()
                    .is_some_and(Self::parts_have_attachments)
        })
    }

    /// Maps a Gmail message into the unified shape.
    ///
    /// Absent fields get safe defaults: empty strings, `false`, the current
    /// time. The read flag derives from the `UNREAD` label.
    fn normalize(message: GmailMessage) -> EmailMessage {
        let payload = message.payload.as_ref();

        let from = payload
            .and_then(|p| Self::extract_header(p, "From"))
            .map(|value| Self::parse_address(&value))
            .unwrap_or_else(|| Address::new("unknown@unknown.com"));

        let subject = payload
            .and_then(|p| Self::extract_header(p, "Subject"))
            .unwrap_or_default();

        let received_at = message
            .internal_date
            .as_deref()
            .and_then(|millis| millis.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        let labels = message.label_ids.unwrap_or_default();
        let is_read = !labels.iter().any(|label| label == "UNREAD");

        let has_attachments = payload
            .and_then(|p| p.parts.as_deref())
            .is_some_and(Self::parts_have_attachments);

        let body = payload.and_then(Self::extract_plain_text);

        EmailMessage {
            id: EmailId::from(message.id.clone()),
            thread_id: ThreadId::from(message.thread_id.unwrap_or(message.id)),
            from,
            subject,
            snippet: message.snippet.unwrap_or_default(),
            body,
            labels,
            received_at,
            is_read,
            has_attachments,
        }
    }

    /// Builds the raw RFC 822-style text Gmail's send endpoint expects.
    ///
    /// `From: me` lets the API substitute the authenticated account's
    /// address.
    fn build_raw(outgoing: &OutgoingMessage) -> String {
        let body = if outgoing.is_html {
            format!("<html><body>{}</body></html>", outgoing.body)
        } else {
            outgoing.body.clone()
        };
        format!(
            "From: me\nTo: {}\nSubject: {}\n\n{}",
            outgoing.to, outgoing.subject, body
        )
    }
}

#[async_trait]
impl MailProvider for GmailProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gmail
    }

    async fn fetch_messages(&self, max_results: u32) -> Result<MessageBatch> {
        let Some(token) = self.token() else {
            tracing::warn!("no Gmail access token configured, serving demo inbox");
            return Ok(demo::gmail_batch());
        };

        let url = format!(
            "{}/messages?maxResults={}&format=metadata&metadataHeaders=FROM,SUBJECT,DATETIME",
            self.base_url, max_results
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| MailError::Transport(format!("Gmail list request failed: {}", e)))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Gmail access token rejected (401), serving demo inbox");
            return Ok(demo::gmail_batch());
        }

        if !response.status().is_success() {
            return Err(MailError::Transport(format!(
                "Gmail list request returned status {}",
                response.status()
            )));
        }

        let list: MessageListResponse = response
            .json()
            .await
            .map_err(|e| MailError::Malformed(format!("Gmail list response: {}", e)))?;

        let refs = list.messages.unwrap_or_default();
        let details = futures::future::join_all(
            refs.iter().map(|message| self.fetch_detail(token, &message.id)),
        )
        .await;

        let messages: Vec<EmailMessage> = details
            .into_iter()
            .flatten()
            .map(Self::normalize)
            .collect();

        Ok(MessageBatch::new(messages))
    }

    async fn send_message(&self, outgoing: &OutgoingMessage) -> SendOutcome {
        let Some(token) = self.token() else {
            return SendOutcome::failed("Google API token not configured");
        };

        let raw = BASE64_URL_SAFE_NO_PAD.encode(Self::build_raw(outgoing).as_bytes());
        let url = format!("{}/messages/send", self.base_url);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .json(&SendRequest { raw })
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "Gmail send request failed");
                return SendOutcome::failed("Failed to send email");
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let reason = response
                .json::<GmailErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| "Failed to send email".to_string());
            tracing::error!(%status, %reason, "Gmail send rejected");
            return SendOutcome::failed(reason);
        }

        match response.json::<SendResponse>().await {
            Ok(sent) => SendOutcome::sent(sent.id),
            Err(error) => {
                tracing::error!(%error, "undecodable Gmail send response");
                SendOutcome::failed("Failed to send email")
            }
        }
    }

    async fn mark_read(&self, message_id: &str) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        let url = format!("{}/messages/{}/modify", self.base_url, message_id);
        let body = ModifyRequest {
            remove_label_ids: vec!["UNREAD".to_string()],
        };

        match self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::warn!(%message_id, %error, "Gmail mark-read failed");
                false
            }
        }
    }

    async fn message_body(&self, message_id: &str) -> String {
        let Some(token) = self.token() else {
            return demo::body_placeholder(message_id);
        };

        let url = format!("{}/messages/{}?format=full", self.base_url, message_id);

        let response = match self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%message_id, %error, "Gmail content fetch failed");
                return "Error fetching email content".to_string();
            }
        };

        if !response.status().is_success() {
            return format!("Failed to fetch email content: {}", response.status());
        }

        let message: GmailMessage = match response.json().await {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%message_id, %error, "undecodable Gmail message");
                return "Error fetching email content".to_string();
            }
        };

        if let Some(text) = message.payload.as_ref().and_then(Self::extract_plain_text) {
            return text;
        }

        message
            .snippet
            .filter(|snippet| !snippet.is_empty())
            .unwrap_or_else(|| "No content available".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_without_token() -> GmailProvider {
        GmailProvider::new(&GmailSettings::default())
    }

    #[test]
    fn kind_is_gmail() {
        assert_eq!(provider_without_token().kind(), ProviderKind::Gmail);
    }

    #[test]
    fn empty_token_counts_as_unconfigured() {
        let settings = GmailSettings {
            access_token: Some(String::new()),
            ..Default::default()
        };
        let provider = GmailProvider::new(&settings);
        assert!(provider.token().is_none());
    }

    #[test]
    fn parse_address_with_display_name() {
        let addr = GmailProvider::parse_address("Sarah Johnson <sarah@client.com>");
        assert_eq!(addr.email, "sarah@client.com");
        assert_eq!(addr.name, Some("Sarah Johnson".to_string()));
    }

    #[test]
    fn parse_address_bare_email() {
        let addr = GmailProvider::parse_address("billing@officesupplies.com");
        assert_eq!(addr.email, "billing@officesupplies.com");
        assert!(addr.name.is_none());
    }

    #[test]
    fn normalize_reads_labels_and_headers() {
        let json = serde_json::json!({
            "id": "msg-1",
            "threadId": "thread-1",
            "labelIds": ["INBOX", "UNREAD"],
            "snippet": "Quick preview",
            "internalDate": "1732359200000",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "From", "value": "Sarah Johnson <sarah@client.com>"},
                    {"name": "Subject", "value": "Contract review"}
                ],
                "parts": [
                    {"mimeType": "text/html", "body": {"data": "PGI+aGk8L2I+"}},
                    {"mimeType": "application/pdf", "filename": "contract.pdf"}
                ]
            }
        });
        let message: GmailMessage = serde_json::from_value(json).unwrap();
        let normalized = GmailProvider::normalize(message);

        assert_eq!(normalized.id, EmailId::from("msg-1"));
        assert_eq!(normalized.thread_id, ThreadId::from("thread-1"));
        assert_eq!(normalized.from.email, "sarah@client.com");
        assert_eq!(normalized.subject, "Contract review");
        assert!(!normalized.is_read);
        assert!(normalized.has_attachments);
        assert_eq!(normalized.received_at.timestamp_millis(), 1_732_359_200_000);
        // HTML-only payload carries no plain-text body.
        assert!(normalized.body.is_none());
    }

    #[test]
    fn normalize_fills_safe_defaults() {
        let json = serde_json::json!({"id": "bare"});
        let message: GmailMessage = serde_json::from_value(json).unwrap();
        let normalized = GmailProvider::normalize(message);

        assert_eq!(normalized.thread_id, ThreadId::from("bare"));
        assert_eq!(normalized.from.email, "unknown@unknown.com");
        assert_eq!(normalized.subject, "");
        assert!(normalized.is_read);
        assert!(!normalized.has_attachments);
        assert!(normalized.labels.is_empty());
    }

    #[test]
    fn extract_plain_text_prefers_first_plain_part() {
        // "first" / "second" in base64url
        let json = serde_json::json!({
            "mimeType": "multipart/mixed",
            "parts": [
                {"mimeType": "text/html", "body": {"data": "PGI-PC9iPg"}},
                {"mimeType": "text/plain", "body": {"data": "Zmlyc3Q"}},
                {"mimeType": "text/plain", "body": {"data": "c2Vjb25k"}}
            ]
        });
        let payload: GmailPayload = serde_json::from_value(json).unwrap();
        assert_eq!(
            GmailProvider::extract_plain_text(&payload),
            Some("first".to_string())
        );
    }

    #[test]
    fn extract_plain_text_normalizes_single_part_line_endings() {
        // "line one\r\nline two" in base64url
        let json = serde_json::json!({
            "mimeType": "text/plain",
            "body": {"data": "bGluZSBvbmUNCmxpbmUgdHdv"}
        });
        let payload: GmailPayload = serde_json::from_value(json).unwrap();
        assert_eq!(
            GmailProvider::extract_plain_text(&payload),
            Some("line one\nline two".to_string())
        );
    }

    #[test]
    fn extract_plain_text_walks_nested_parts() {
        let json = serde_json::json!({
            "mimeType": "multipart/mixed",
            "parts": [
                {
                    "mimeType": "multipart/alternative",
                    "parts": [
                        {"mimeType": "text/plain", "body": {"data": "bmVzdGVk"}}
                    ]
                }
            ]
        });
        let payload: GmailPayload = serde_json::from_value(json).unwrap();
        assert_eq!(
            GmailProvider::extract_plain_text(&payload),
            Some("nested".to_string())
        );
    }

    #[test]
    fn build_raw_wraps_html_bodies() {
        let outgoing = OutgoingMessage::html("to@example.com", "Hello", "<p>Hi</p>");
        let raw = GmailProvider::build_raw(&outgoing);
        assert!(raw.starts_with("From: me\nTo: to@example.com\nSubject: Hello\n\n"));
        assert!(raw.ends_with("<html><body><p>Hi</p></body></html>"));

        let plain = OutgoingMessage::plain_text("to@example.com", "Hello", "Hi");
        let raw = GmailProvider::build_raw(&plain);
        assert!(raw.ends_with("\n\nHi"));
    }

    #[tokio::test]
    async fn fetch_without_token_serves_demo_inbox() {
        let batch = provider_without_token().fetch_messages(10).await.unwrap();
        assert_eq!(batch.total, 5);
        assert_eq!(batch.unread, 2);
    }

    #[tokio::test]
    async fn send_without_token_fails_fast() {
        let outcome = provider_without_token()
            .send_message(&OutgoingMessage::plain_text("a@b.com", "s", "b"))
            .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn mark_read_without_token_is_false() {
        assert!(!provider_without_token().mark_read("msg-1").await);
    }

    #[tokio::test]
    async fn body_without_token_is_placeholder() {
        let body = provider_without_token().message_body("msg-1").await;
        assert!(body.contains("msg-1"));
    }
}
