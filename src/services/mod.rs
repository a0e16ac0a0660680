//! Business services over the provider adapters.

mod assistant_service;
mod email_service;

pub use assistant_service::{AssistantService, DocumentKind, EmailMetadata, Priority};
pub use email_service::{EmailService, ProviderInfo};
