//! Mail provider trait definition.
//!
//! This module defines the [`MailProvider`] trait which abstracts over the
//! vendor REST backends (Gmail API, Microsoft Graph). Both adapters
//! implement this trait and are selected by the configuration-driven
//! factory in [`super::provider_from_settings`].

use async_trait::async_trait;

use crate::domain::{MessageBatch, OutgoingMessage, ProviderKind, SendOutcome};

/// Result type alias for mail provider operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Errors that can occur during mail provider operations.
///
/// Only two conditions ever surface: missing credentials and rejected
/// (401) tokens degrade to the demo dataset inside the adapters, and send
/// failures report through [`SendOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Network failure or a non-auth error status from the vendor.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The vendor returned a payload that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Trait for vendor mail adapter implementations.
///
/// Each adapter normalizes its vendor's payloads into the unified
/// [`MessageBatch`]/[`crate::domain::EmailMessage`] shapes, so callers
/// never branch on vendor-specific fields.
///
/// Error posture differs per operation, by design:
/// - `fetch_messages` degrades to the fixed demo batch on a missing or
///   rejected (401) credential and only errors on other transport failures;
/// - `send_message` reports every failure through [`SendOutcome`];
/// - `mark_read` and `message_body` are best-effort and total.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Which vendor this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Fetches up to `max_results` inbox messages, normalized.
    async fn fetch_messages(&self, max_results: u32) -> Result<MessageBatch>;

    /// Sends a message. Failures land in the outcome, never in an `Err`.
    async fn send_message(&self, outgoing: &OutgoingMessage) -> SendOutcome;

    /// Marks a message as read. Best-effort: returns `false` on any failure.
    async fn mark_read(&self, message_id: &str) -> bool;

    /// Fetches the plain-text body of a message, best-effort.
    ///
    /// Always returns displayable text: the extracted body, the snippet,
    /// or a human-readable placeholder. Never empty, never an error.
    async fn message_body(&self, message_id: &str) -> String;
}
