//! Outlook adapter backed by the Microsoft Graph API.
//!
//! Listing selects the inbox folder ordered newest first; sending posts to
//! `/me/sendMail`, which answers `202 Accepted` with no body and no message
//! id. Without a Graph token, or on a 401 answer, the adapter serves the
//! fixed demo inbox.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{demo, MailError, MailProvider, Result};
use crate::config::OutlookSettings;
use crate::domain::{
    Address, EmailId, EmailMessage, MessageBatch, OutgoingMessage, ProviderKind, SendOutcome,
    ThreadId,
};

const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LIST_FIELDS: &str =
    "id,conversationId,subject,from,receivedDateTime,hasAttachments,isRead,bodyPreview,body,categories";

/// Graph message list envelope.
#[derive(Debug, Deserialize)]
struct MessageListResponse {
    value: Option<Vec<GraphMessage>>,
}

/// Graph message resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessage {
    id: String,
    conversation_id: Option<String>,
    subject: Option<String>,
    from: Option<GraphRecipient>,
    received_date_time: Option<String>,
    has_attachments: Option<bool>,
    is_read: Option<bool>,
    body_preview: Option<String>,
    body: Option<GraphBody>,
    categories: Option<Vec<String>>,
}

/// Graph recipient wrapper.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRecipient {
    email_address: GraphEmailAddress,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphEmailAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    address: Option<String>,
}

/// Graph message body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphBody {
    content_type: Option<String>,
    content: Option<String>,
}

/// `/me/sendMail` request envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailRequest {
    message: SendMailMessage,
    save_to_sent_items: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailMessage {
    subject: String,
    body: SendMailBody,
    to_recipients: Vec<GraphRecipient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailBody {
    content_type: String,
    content: String,
}

/// Graph error envelope.
#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: Option<GraphErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    message: Option<String>,
}

/// Microsoft Graph mail adapter.
pub struct OutlookProvider {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl OutlookProvider {
    /// Creates an adapter from Outlook settings.
    pub fn new(settings: &OutlookSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GRAPH_API_BASE.to_string(),
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

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Maps a Graph message into the unified shape.
    ///
    /// Graph reports the read flag directly; it is still passed through the
    /// batch constructor so unread counts are always recomputed locally.
    fn normalize(message: GraphMessage) -> EmailMessage {
        let from = message
            .from
            .and_then(|recipient| {
                recipient.email_address.address.map(|address| Address {
                    email: address,
                    name: recipient.email_address.name,
                })
            })
            .unwrap_or_else(|| Address::new("unknown@unknown.com"));

        let received_at = message
            .received_date_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        EmailMessage {
            id: EmailId::from(message.id.clone()),
            thread_id: ThreadId::from(message.conversation_id.unwrap_or(message.id)),
            from,
            subject: message.subject.unwrap_or_default(),
            snippet: message.body_preview.unwrap_or_default(),
            body: message.body.and_then(|body| body.content),
            labels: message.categories.unwrap_or_default(),
            received_at,
            is_read: message.is_read.unwrap_or(false),
            has_attachments: message.has_attachments.unwrap_or(false),
        }
    }

    /// Extracts the plain-text view of a fetched message.
    ///
    /// Graph serves `body.content` as HTML unless the message was stored as
    /// text, so HTML bodies fall back to the plain-text `bodyPreview`.
    fn extract_content(message: GraphMessage) -> String {
        let is_text = message
            .body
            .as_ref()
            .and_then(|body| body.content_type.as_deref())
            .is_some_and(|kind| kind.eq_ignore_ascii_case("text"));

        if is_text {
            if let Some(content) = message.body.and_then(|body| body.content) {
                if !content.is_empty() {
                    return content;
                }
            }
        }

        message
            .body_preview
            .filter(|preview| !preview.is_empty())
            .unwrap_or_else(|| "No content available".to_string())
    }

    fn build_send_request(outgoing: &OutgoingMessage) -> SendMailRequest {
        SendMailRequest {
            message: SendMailMessage {
                subject: outgoing.subject.clone(),
                body: SendMailBody {
                    content_type: if outgoing.is_html { "HTML" } else { "Text" }.to_string(),
                    content: outgoing.body.clone(),
                },
                to_recipients: vec![GraphRecipient {
                    email_address: GraphEmailAddress {
                        name: None,
                        address: Some(outgoing.to.clone()),
                    },
                }],
            },
            save_to_sent_items: true,
        }
    }
}

#[async_trait]
impl MailProvider for OutlookProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Outlook
    }

    async fn fetch_messages(&self, max_results: u32) -> Result<MessageBatch> {
        let Some(token) = self.token() else {
            tracing::warn!("no Outlook access token configured, serving demo inbox");
            return Ok(demo::outlook_batch());
        };

        let url = format!("{}/me/mailFolders/inbox/messages", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("$top", max_results.to_string().as_str()),
                ("$select", LIST_FIELDS),
                ("$orderby", "receivedDateTime desc"),
            ])
            .send()
            .await
            .map_err(|e| MailError::Transport(format!("Graph list request failed: {}", e)))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Outlook access token rejected (401), serving demo inbox");
            return Ok(demo::outlook_batch());
        }

        if !response.status().is_success() {
            return Err(MailError::Transport(format!(
                "Graph list request returned status {}",
                response.status()
            )));
        }

        let list: MessageListResponse = response
            .json()
            .await
            .map_err(|e| MailError::Malformed(format!("Graph list response: {}", e)))?;

        let messages: Vec<EmailMessage> = list
            .value
            .unwrap_or_default()
            .into_iter()
            .map(Self::normalize)
            .collect();

        Ok(MessageBatch::new(messages))
    }

    async fn send_message(&self, outgoing: &OutgoingMessage) -> SendOutcome {
        let Some(token) = self.token() else {
            return SendOutcome::failed("Outlook API token not configured");
        };

        let url = format!("{}/me/sendMail", self.base_url);
        let request = Self::build_send_request(outgoing);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "Graph send request failed");
                return SendOutcome::failed("Failed to send email");
            }
        };

        if response.status().is_success() {
            // Graph answers 202 with an empty body; there is no id to report.
            return SendOutcome::accepted();
        }

        let status = response.status();
        let reason = response
            .json::<GraphErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.error)
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| "Failed to send email".to_string());
        tracing::error!(%status, %reason, "Graph send rejected");
        SendOutcome::failed(reason)
    }

    async fn mark_read(&self, message_id: &str) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        let url = format!("{}/me/messages/{}", self.base_url, message_id);

        match self
            .client
            .patch(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({ "isRead": true }))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::warn!(%message_id, %error, "Graph mark-read failed");
                false
            }
        }
    }

    async fn message_body(&self, message_id: &str) -> String {
        let Some(token) = self.token() else {
            return demo::body_placeholder(message_id);
        };

        let url = format!("{}/me/messages/{}", self.base_url, message_id);

        let response = match self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("$select", "subject,body,bodyPreview")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%message_id, %error, "Graph content fetch failed");
                return "Error fetching email content".to_string();
            }
        };

        if !response.status().is_success() {
            return format!("Failed to fetch email content: {}", response.status());
        }

        match response.json::<GraphMessage>().await {
            Ok(message) => Self::extract_content(message),
            Err(error) => {
                tracing::warn!(%message_id, %error, "undecodable Graph message");
                "Error fetching email content".to_string()
            }
        }
    }
}
