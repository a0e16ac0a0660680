//! Text-completion clients.

mod mistral;
mod traits;

pub use mistral::MistralClient;
pub use traits::{CompletionClient, DEFAULT_SYSTEM_PROMPT};
