//! AI assistance over email content.
//!
//! Wraps a [`CompletionClient`] with the prompt templates for drafting
//! replies, summarizing threads, classifying priority, extracting
//! metadata, and generating documents. Like the client underneath, every
//! operation is total: parse failures fall back to fixed defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::providers::ai::CompletionClient;

/// Email priority bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parses a classifier answer, tolerating surrounding prose.
    ///
    /// Anything that names neither HIGH nor LOW is MEDIUM.
    pub fn parse(answer: &str) -> Self {
        let upper = answer.to_uppercase();
        if upper.contains("HIGH") {
            Self::High
        } else if upper.contains("LOW") {
            Self::Low
        } else {
            Self::Medium
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// Structured fields extracted from an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMetadata {
    pub sender: String,
    pub subject: String,
    pub urgency: Priority,
    pub next_steps: Vec<String>,
}

impl Default for EmailMetadata {
    fn default() -> Self {
        Self {
            sender: "Unknown".to_string(),
            subject: "N/A".to_string(),
            urgency: Priority::Medium,
            next_steps: Vec::new(),
        }
    }
}

/// Document templates the generator knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Contract,
    Invoice,
    Proposal,
    Email,
    MeetingNote,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Contract => "contract",
            Self::Invoice => "invoice",
            Self::Proposal => "proposal",
            Self::Email => "email",
            Self::MeetingNote => "meeting-note",
        };
        write!(f, "{}", name)
    }
}

/// Prompt-template layer over a completion client.
pub struct AssistantService {
    client: Box<dyn CompletionClient>,
}

impl AssistantService {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Drafts a professional reply to an email.
    pub async fn draft_reply(&self, email_content: &str) -> String {
        let prompt = format!(
            "Analyze this email and write a professional, helpful response:\n\n\
             Email Content:\n{}\n\n\
             Provide a clear, professional response. If you need more information, ask specific questions.",
            email_content
        );
        self.client
            .ask(
                &prompt,
                Some(
                    "You are a professional administrative assistant responding to business emails. \
                     Write concise, professional responses.",
                ),
            )
            .await
    }

    /// Summarizes a thread in bullet points, under 100 words.
    pub async fn summarize_thread(&self, thread_content: &str) -> String {
        let prompt = format!(
            "Summarize this email thread concisely (under 100 words):\n\n{}\n\n\
             Provide a bullet-point summary of key points and next steps.",
            thread_content
        );
        self.client
            .ask(
                &prompt,
                Some("You are a professional assistant. Summarize email threads in bullet points."),
            )
            .await
    }

    /// Classifies an email's priority.
    pub async fn classify_priority(&self, email_content: &str) -> Priority {
        let prompt = format!(
            "Analyze this email and determine its priority:\n\n{}\n\n\
             Respond with one word only: HIGH, MEDIUM, or LOW.",
            email_content
        );
        let answer = self
            .client
            .ask(
                &prompt,
                Some(
                    "You are an email priority categorizer. \
                     Respond with only 'HIGH', 'MEDIUM', or 'LOW'.",
                ),
            )
            .await;
        Priority::parse(&answer)
    }

    /// Extracts structured metadata from an email.
    ///
    /// An unparseable answer yields the fixed defaults rather than an
    /// error.
    pub async fn extract_metadata(&self, email_content: &str) -> EmailMetadata {
        let prompt = format!(
            "Extract the following information from this email:\n\n\
             Email Content:\n{}\n\n\
             Provide in JSON format:\n\
             {{\n\
             \x20 \"sender\": \"Name or company\",\n\
             \x20 \"subject\": \"Email subject\",\n\
             \x20 \"urgency\": \"HIGH/MEDIUM/LOW\",\n\
             \x20 \"nextSteps\": [\"step1\", \"step2\", ...]\n\
             }}\n\n\
             Respond with only the JSON object.",
            email_content
        );
        let answer = self
            .client
            .ask(
                &prompt,
                Some("You are an email metadata extractor. Respond with only valid JSON."),
            )
            .await;

        match serde_json::from_str(&answer) {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(%error, "metadata answer was not valid JSON, using defaults");
                EmailMetadata::default()
            }
        }
    }

    /// Generates a document of the given kind from a detail map.
    pub async fn draft_document(
        &self,
        kind: DocumentKind,
        details: &BTreeMap<String, String>,
    ) -> String {
        let rendered = serde_json::to_string_pretty(details).unwrap_or_default();
        let prompt = format!(
            "Generate a professional {} document with these details:\n\n{}\n\n\
             Create a well-formatted, professional {} with proper structure.",
            kind, rendered, kind
        );
        self.client
            .ask(
                &prompt,
                Some("You are a professional document generator. Create clean, well-formatted documents."),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned answer and records the prompts it saw.
    struct CannedClient {
        answer: String,
        prompts: Mutex<Vec<(String, Option<String>)>>,
    }

    impl CannedClient {
        fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn ask(&self, prompt: &str, system_prompt: Option<&str>) -> String {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), system_prompt.map(str::to_string)));
            self.answer.clone()
        }
    }

    #[test]
    fn priority_parse_tolerates_prose() {
        assert_eq!(Priority::parse("HIGH"), Priority::High);
        assert_eq!(Priority::parse("Priority: low."), Priority::Low);
        assert_eq!(Priority::parse("MEDIUM"), Priority::Medium);
        assert_eq!(Priority::parse("not sure"), Priority::Medium);
    }

    #[tokio::test]
    async fn draft_reply_embeds_email_content() {
        let service = AssistantService::new(Box::new(CannedClient::answering("Dear Sarah, ...")));
        let reply = service.draft_reply("Please review the contract.").await;
        assert_eq!(reply, "Dear Sarah, ...");
    }

    #[tokio::test]
    async fn classify_priority_parses_answer() {
        let service = AssistantService::new(Box::new(CannedClient::answering("LOW")));
        assert_eq!(service.classify_priority("newsletter").await, Priority::Low);
    }

    #[tokio::test]
    async fn extract_metadata_parses_json() {
        let answer = r#"{"sender":"Sarah Johnson","subject":"Contract","urgency":"HIGH","nextSteps":["review","sign"]}"#;
        let service = AssistantService::new(Box::new(CannedClient::answering(answer)));
        let metadata = service.extract_metadata("...").await;
        assert_eq!(metadata.sender, "Sarah Johnson");
        assert_eq!(metadata.urgency, Priority::High);
        assert_eq!(metadata.next_steps, vec!["review", "sign"]);
    }

    #[tokio::test]
    async fn extract_metadata_defaults_on_bad_json() {
        let service = AssistantService::new(Box::new(CannedClient::answering("not json at all")));
        let metadata = service.extract_metadata("...").await;
        assert_eq!(metadata.sender, "Unknown");
        assert_eq!(metadata.subject, "N/A");
        assert_eq!(metadata.urgency, Priority::Medium);
        assert!(metadata.next_steps.is_empty());
    }

    #[tokio::test]
    async fn draft_document_names_the_kind() {
        let client = Box::new(CannedClient::answering("INVOICE #42"));
        let service = AssistantService::new(client);
        let mut details = BTreeMap::new();
        details.insert("client".to_string(), "Acme".to_string());
        let result = service.draft_document(DocumentKind::Invoice, &details).await;
        assert_eq!(result, "INVOICE #42");
    }

    #[tokio::test]
    async fn prompts_carry_role_specific_system_prompts() {
        let recording = std::sync::Arc::new(CannedClient::answering("MEDIUM"));
        let service = AssistantService::new(Box::new(SharedClient(recording.clone())));
        service.classify_priority("some email").await;

        let seen = recording.prompts.lock().unwrap();
        assert!(seen[0]
            .0
            .contains("Respond with one word only: HIGH, MEDIUM, or LOW."));
        assert!(seen[0]
            .1
            .as_deref()
            .unwrap()
            .contains("email priority categorizer"));
    }

    struct SharedClient(std::sync::Arc<CannedClient>);

    #[async_trait]
    impl CompletionClient for SharedClient {
        async fn ask(&self, prompt: &str, system_prompt: Option<&str>) -> String {
            self.0.ask(prompt, system_prompt).await
        }
    }
}
