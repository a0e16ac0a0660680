//! Email provider adapters.
//!
//! Each vendor API is wrapped in a [`MailProvider`] implementation that
//! exposes the unified message shape. [`provider_from_settings`] picks the
//! adapter once, at construction; callers never re-read the environment per
//! request.

pub mod demo;
mod gmail;
mod outlook;
mod smtp;
mod traits;

pub use gmail::GmailProvider;
pub use outlook::OutlookProvider;
pub use smtp::{SmtpEndpoint, SmtpMailer, SmtpStatus};
pub use traits::{MailError, MailProvider, Result};

use crate::config::MailSettings;
use crate::domain::ProviderKind;

/// Builds the adapter the settings select.
pub fn provider_from_settings(settings: &MailSettings) -> Box<dyn MailProvider> {
    match settings.provider {
        ProviderKind::Gmail => Box::new(GmailProvider::new(&settings.gmail)),
        ProviderKind::Outlook => Box::new(OutlookProvider::new(&settings.outlook)),
    }
}
