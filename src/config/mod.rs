//! Configuration loading.
//!
//! This module provides the environment-sourced settings tree consumed
//! at service construction time.

mod settings;

pub use settings::{
    CompletionSettings, GmailSettings, MailSettings, OutlookSettings, SmtpCredentials,
};
