//! Unified email dispatch.
//!
//! [`EmailService`] owns one provider adapter, chosen once at
//! construction from the settings. Every mailbox operation goes through
//! the adapter's unified shape, so callers never see vendor payloads.

use serde::Serialize;

use crate::config::MailSettings;
use crate::domain::{MessageBatch, OutgoingMessage, ProviderKind, SendOutcome};
use crate::providers::ai::MistralClient;
use crate::providers::email::{provider_from_settings, MailProvider, Result, SmtpMailer, SmtpStatus};
use crate::services::AssistantService;

/// Description of the active provider, for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub provider: ProviderKind,
    pub display_name: String,
    pub description: String,
    pub requires_auth: bool,
    pub available: bool,
}

/// Provider-agnostic mailbox operations plus AI assistance.
pub struct EmailService {
    provider: Box<dyn MailProvider>,
    assistant: AssistantService,
    smtp: SmtpMailer,
    credentialed: bool,
}

impl EmailService {
    /// Builds a service from settings, resolving the provider once.
    pub fn from_settings(settings: &MailSettings) -> Self {
        let credentialed = settings.selected_access_token().is_some();
        Self {
            provider: provider_from_settings(settings),
            assistant: AssistantService::new(Box::new(MistralClient::new(&settings.completion))),
            smtp: SmtpMailer::for_provider(settings.provider, settings),
            credentialed,
        }
    }

    /// Builds a service from the process environment.
    pub fn from_env() -> Self {
        Self::from_settings(&MailSettings::from_env())
    }

    /// Builds a service over explicit parts, for tests.
    #[cfg(test)]
    fn with_parts(provider: Box<dyn MailProvider>, assistant: AssistantService) -> Self {
        Self {
            provider,
            assistant,
            smtp: SmtpMailer::for_provider(ProviderKind::Gmail, &MailSettings::default()),
            credentialed: true,
        }
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Reports the active provider and whether live credentials back it.
    pub fn provider_info(&self) -> ProviderInfo {
        let kind = self.provider.kind();
        let description = match kind {
            ProviderKind::Gmail => "Google Gmail via the Gmail API",
            ProviderKind::Outlook => "Microsoft Outlook via the Graph API",
        };
        ProviderInfo {
            provider: kind,
            display_name: kind.display_name().to_string(),
            description: description.to_string(),
            requires_auth: true,
            available: self.credentialed,
        }
    }

    /// Fetches the inbox through the active provider.
    pub async fn fetch_inbox(&self, max_results: u32) -> Result<MessageBatch> {
        self.provider.fetch_messages(max_results).await
    }

    /// Sends a message through the active provider's API.
    pub async fn send(&self, outgoing: &OutgoingMessage) -> SendOutcome {
        self.provider.send_message(outgoing).await
    }

    /// Sends a message over the provider's SMTP relay instead of its API.
    pub async fn send_via_smtp(&self, outgoing: &OutgoingMessage) -> SendOutcome {
        self.smtp.send(outgoing).await
    }

    /// Reports SMTP credential state for the active provider.
    pub fn smtp_status(&self) -> SmtpStatus {
        self.smtp.status()
    }

    /// Marks a message read; false means the change did not take.
    pub async fn mark_read(&self, message_id: &str) -> bool {
        self.provider.mark_read(message_id).await
    }

    /// Fetches the readable body of one message.
    pub async fn message_body(&self, message_id: &str) -> String {
        self.provider.message_body(message_id).await
    }

    /// Drafts an AI reply to the given email body text.
    pub async fn generate_response(&self, email_body: &str) -> String {
        self.assistant.draft_reply(email_body).await
    }

    /// Drafts an AI reply to a stored message, fetching its body first.
    pub async fn generate_response_for_message(&self, message_id: &str) -> String {
        let content = self.provider.message_body(message_id).await;
        self.assistant.draft_reply(&content).await
    }

    /// The AI assistance layer, for operations on caller-supplied text.
    pub fn assistant(&self) -> &AssistantService {
        &self.assistant
    }
}
