//! Message domain types.
//!
//! The unified message shape every provider normalizes into, plus the
//! outgoing-message and send-result DTOs. Nothing here is persisted;
//! these are transient values flowing between a provider and its caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmailId, ThreadId};

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    pub email: String,
    /// Display name (e.g., "John Doe").
    pub name: Option<String>,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates a new address with email and display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Returns the display representation of this address.
    ///
    /// If a name is present, returns "Name <email>", otherwise just the email.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// A single email message in the unified, vendor-agnostic shape.
///
/// Both the Gmail and the Outlook adapter produce exactly this shape.
/// Fields a vendor payload does not carry are filled with safe defaults
/// (empty string, `false`, the current time) during normalization; callers
/// never see a partially-populated message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Vendor-assigned message identifier.
    pub id: EmailId,
    /// Conversation this message belongs to.
    pub thread_id: ThreadId,
    /// Sender address.
    pub from: Address,
    /// Subject line.
    pub subject: String,
    /// Short preview of the message content.
    pub snippet: String,
    /// Full plain-text body, when the list fetch carried one.
    pub body: Option<String>,
    /// Labels or categories applied to this message.
    pub labels: Vec<String>,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Whether the message carries attachments.
    pub has_attachments: bool,
}

/// A page of fetched messages with counters recomputed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBatch {
    /// The normalized messages.
    pub messages: Vec<EmailMessage>,
    /// Number of messages in this batch.
    pub total: usize,
    /// Number of unread messages in this batch.
    pub unread: usize,
}

impl MessageBatch {
    /// Builds a batch from normalized messages.
    ///
    /// `total` and `unread` are always derived from the messages themselves,
    /// never taken from a vendor-reported counter.
    pub fn new(messages: Vec<EmailMessage>) -> Self {
        let total = messages.len();
        let unread = messages.iter().filter(|m| !m.is_read).count();
        Self {
            messages,
            total,
            unread,
        }
    }

    /// An empty batch.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// A message to be sent through any provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body, HTML or plain text per `is_html`.
    pub body: String,
    /// Whether `body` is HTML.
    pub is_html: bool,
}

impl OutgoingMessage {
    /// Creates an HTML message.
    pub fn html(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            is_html: true,
        }
    }

    /// Creates a plain-text message.
    pub fn plain_text(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            is_html: false,
        }
    }
}

/// Outcome of a send operation.
///
/// Send failures are always reported through this value, never raised;
/// `error` carries a human-readable reason when `success` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    /// Whether the message was accepted by the vendor.
    pub success: bool,
    /// Vendor-assigned identifier of the sent message, when one is returned.
    pub message_id: Option<String>,
    /// Human-readable failure reason.
    pub error: Option<String>,
}

impl SendOutcome {
    /// A successful send with a vendor-assigned message id.
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    /// A successful send where the vendor returns no message id
    /// (Graph's sendMail replies 202 with an empty body).
    pub fn accepted() -> Self {
        Self {
            success: true,
            message_id: None,
            error: None,
        }
    }

    /// A failed send with a human-readable reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}
