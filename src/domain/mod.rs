//! Domain layer types for the mail transport layer.
//!
//! This module contains the unified message shapes every provider
//! normalizes into, plus identifier newtypes and the provider selector.

mod message;
mod types;

pub use message::{Address, EmailMessage, MessageBatch, OutgoingMessage, SendOutcome};
pub use types::{EmailId, ProviderKind, ThreadId};
