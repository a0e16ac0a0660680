//! Mail transport settings.
//!
//! Settings are sourced from the process environment (a `.env` file is
//! honored when present), read once into this tree, and never written back.
//! Tokens are assumed pre-provisioned; there is no refresh or expiry
//! tracking here.

use dotenv::dotenv;
use std::env;

use crate::domain::ProviderKind;

/// Top-level settings for the mail transport layer.
#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    /// Which provider the unified dispatcher uses.
    pub provider: ProviderKind,
    /// Gmail REST and SMTP configuration.
    pub gmail: GmailSettings,
    /// Outlook (Microsoft Graph) REST and SMTP configuration.
    pub outlook: OutlookSettings,
    /// Text-completion API configuration.
    pub completion: CompletionSettings,
}

/// Gmail configuration.
#[derive(Debug, Clone, Default)]
pub struct GmailSettings {
    /// Pre-provisioned Gmail API access token.
    pub access_token: Option<String>,
    /// App-password credentials for the Gmail SMTP relay.
    pub smtp: SmtpCredentials,
}

/// Outlook configuration.
#[derive(Debug, Clone, Default)]
pub struct OutlookSettings {
    /// Pre-provisioned Microsoft Graph access token.
    pub access_token: Option<String>,
    /// Credentials for the Outlook SMTP relay.
    pub smtp: SmtpCredentials,
}

/// Mailbox user/password pair for an SMTP relay.
#[derive(Debug, Clone, Default)]
pub struct SmtpCredentials {
    /// Mailbox user (usually the email address).
    pub user: Option<String>,
    /// Password or app-specific password.
    pub password: Option<String>,
}

impl SmtpCredentials {
    /// Creates credentials from explicit values.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
        }
    }

    /// Returns whether both user and password are present.
    pub fn is_configured(&self) -> bool {
        self.pair().is_some()
    }

    /// Returns the user/password pair when both are present and non-empty.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

/// Text-completion API configuration.
#[derive(Debug, Clone, Default)]
pub struct CompletionSettings {
    /// Mistral API key; absent means completion calls return placeholder text.
    pub api_key: Option<String>,
}

/// Reads the first non-empty value among the named environment variables.
fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|value| !value.is_empty()))
}

impl MailSettings {
    /// Loads settings from the process environment.
    ///
    /// Honors a `.env` file when one is present. Each variable has a
    /// fallback name kept for compatibility with existing deployments:
    ///
    /// | Variable | Fallback | Effect |
    /// |---|---|---|
    /// | `EMAIL_PROVIDER` | — | `gmail` or `outlook`, default `gmail` |
    /// | `GOOGLE_ACCESS_TOKEN` | `GOOGLE_CLIENT_EMAIL` | Gmail REST calls |
    /// | `OUTLOOK_ACCESS_TOKEN` | `OUTLOOK_CLIENT_SECRET` | Graph REST calls |
    /// | `GOOGLE_SMTP_USER` | `EMAIL_USER` | Gmail SMTP user |
    /// | `GOOGLE_APP_PASSWORD` | `EMAIL_PASSWORD` | Gmail SMTP password |
    /// | `OUTLOOK_SMTP_USER` | `OUTLOOK_EMAIL` | Outlook SMTP user |
    /// | `OUTLOOK_SMTP_PASSWORD` | `OUTLOOK_APP_PASSWORD` | Outlook SMTP password |
    /// | `MISTRAL_API_KEY` | — | real completion calls |
    pub fn from_env() -> Self {
        let _ = dotenv();

        let provider = env::var("EMAIL_PROVIDER")
            .map(|value| ProviderKind::parse(&value))
            .unwrap_or_default();

        Self {
            provider,
            gmail: GmailSettings {
                access_token: env_first(&["GOOGLE_ACCESS_TOKEN", "GOOGLE_CLIENT_EMAIL"]),
                smtp: SmtpCredentials {
                    user: env_first(&["GOOGLE_SMTP_USER", "EMAIL_USER"]),
                    password: env_first(&["GOOGLE_APP_PASSWORD", "EMAIL_PASSWORD"]),
                },
            },
            outlook: OutlookSettings {
                access_token: env_first(&["OUTLOOK_ACCESS_TOKEN", "OUTLOOK_CLIENT_SECRET"]),
                smtp: SmtpCredentials {
                    user: env_first(&["OUTLOOK_SMTP_USER", "OUTLOOK_EMAIL"]),
                    password: env_first(&["OUTLOOK_SMTP_PASSWORD", "OUTLOOK_APP_PASSWORD"]),
                },
            },
            completion: CompletionSettings {
                api_key: env_first(&["MISTRAL_API_KEY"]),
            },
        }
    }

    /// Access token for the selected provider, if configured.
    pub fn selected_access_token(&self) -> Option<&str> {
        match self.provider {
            ProviderKind::Gmail => self.gmail.access_token.as_deref(),
            ProviderKind::Outlook => self.outlook.access_token.as_deref(),
        }
    }

    /// SMTP credentials for the selected provider.
    pub fn selected_smtp(&self) -> &SmtpCredentials {
        match self.provider {
            ProviderKind::Gmail => &self.gmail.smtp,
            ProviderKind::Outlook => &self.outlook.smtp,
        }
    }
}
