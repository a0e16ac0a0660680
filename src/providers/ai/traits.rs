//! Text-completion client trait.

use async_trait::async_trait;

/// System prompt used when a caller does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a professional administrative assistant. Provide clear, concise, and helpful responses.";

/// A chat-completion backend.
///
/// `ask` is total: configuration and transport problems come back as
/// readable text (placeholder or `Error: ...` prefixed), never as `Err`,
/// so callers can surface the string directly.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn ask(&self, prompt: &str, system_prompt: Option<&str>) -> String;
}
