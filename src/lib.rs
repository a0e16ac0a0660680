//! postdesk - Provider-agnostic email transport with AI drafting
//!
//! This crate unifies Gmail and Outlook mailboxes behind one message
//! shape and one provider trait, adds SMTP relay sending, and layers
//! Mistral-backed drafting, summarizing, and classification on top.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;

pub use config::MailSettings;
pub use domain::{EmailMessage, MessageBatch, OutgoingMessage, ProviderKind, SendOutcome};
pub use services::{AssistantService, EmailService};
