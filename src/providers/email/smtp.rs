//! SMTP relay sending.
//!
//! An alternative send path that bypasses each vendor's REST API and talks
//! to its SMTP relay with app-password credentials. Both relays use
//! STARTTLS on port 587. The connection is verified before every send so a
//! bad credential fails with a clear message instead of a mid-transfer
//! error.

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;

use crate::config::{MailSettings, SmtpCredentials};
use crate::domain::{OutgoingMessage, ProviderKind, SendOutcome};

/// Host/port pair for a vendor's SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
}

impl SmtpEndpoint {
    /// Gmail's STARTTLS relay.
    pub fn gmail() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
        }
    }

    /// Outlook's STARTTLS relay.
    pub fn outlook() -> Self {
        Self {
            host: "smtp-mail.outlook.com".to_string(),
            port: 587,
        }
    }

    pub fn for_provider(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Gmail => Self::gmail(),
            ProviderKind::Outlook => Self::outlook(),
        }
    }
}

/// Reported SMTP configuration state, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SmtpStatus {
    pub provider: ProviderKind,
    pub configured: bool,
}

/// Sends mail over a vendor SMTP relay.
pub struct SmtpMailer {
    provider: ProviderKind,
    endpoint: SmtpEndpoint,
    credentials: SmtpCredentials,
}

impl SmtpMailer {
    /// Creates a mailer over an explicit endpoint and credential pair.
    pub fn new(provider: ProviderKind, endpoint: SmtpEndpoint, credentials: SmtpCredentials) -> Self {
        Self {
            provider,
            endpoint,
            credentials,
        }
    }

    /// Creates a mailer for the given provider, pulling its credentials
    /// from the settings.
    pub fn for_provider(kind: ProviderKind, settings: &MailSettings) -> Self {
        let credentials = match kind {
            ProviderKind::Gmail => settings.gmail.smtp.clone(),
            ProviderKind::Outlook => settings.outlook.smtp.clone(),
        };
        Self::new(kind, SmtpEndpoint::for_provider(kind), credentials)
    }

    /// Reports whether credentials are present, without connecting.
    pub fn status(&self) -> SmtpStatus {
        SmtpStatus {
            provider: self.provider,
            configured: self.credentials.is_configured(),
        }
    }

    fn transport(
        &self,
        user: &str,
        password: &str,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.endpoint.host)?
                .port(self.endpoint.port)
                .credentials(Credentials::new(user.to_string(), password.to_string()))
                .build(),
        )
    }

    /// Verifies the relay connection and credentials without sending.
    pub async fn verify(&self) -> SendOutcome {
        let Some((user, password)) = self.credentials.pair() else {
            return SendOutcome::failed("SMTP credentials not configured");
        };

        let transport = match self.transport(user, password) {
            Ok(transport) => transport,
            Err(error) => return SendOutcome::failed(format!("SMTP setup failed: {}", error)),
        };

        match transport.test_connection().await {
            Ok(true) => SendOutcome::accepted(),
            Ok(false) => SendOutcome::failed("SMTP connection verification failed"),
            Err(error) => SendOutcome::failed(format!("SMTP verification failed: {}", error)),
        }
    }

    /// Sends a message over the relay.
    ///
    /// HTML messages go out as a multipart alternative with a tag-stripped
    /// plain-text sibling. With no credentials this fails without opening
    /// a connection.
    pub async fn send(&self, outgoing: &OutgoingMessage) -> SendOutcome {
        let Some((user, password)) = self.credentials.pair() else {
            return SendOutcome::failed("SMTP credentials not configured");
        };

        let from: Mailbox = match user.parse() {
            Ok(mailbox) => mailbox,
            Err(error) => {
                return SendOutcome::failed(format!("invalid sender address: {}", error))
            }
        };
        let to: Mailbox = match outgoing.to.parse() {
            Ok(mailbox) => mailbox,
            Err(error) => {
                return SendOutcome::failed(format!("invalid recipient address: {}", error))
            }
        };

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(&outgoing.subject);

        let message = if outgoing.is_html {
            builder.multipart(MultiPart::alternative_plain_html(
                strip_tags(&outgoing.body),
                outgoing.body.clone(),
            ))
        } else {
            builder.body(outgoing.body.clone())
        };
        let message = match message {
            Ok(message) => message,
            Err(error) => return SendOutcome::failed(format!("message build failed: {}", error)),
        };

        let transport = match self.transport(user, password) {
            Ok(transport) => transport,
            Err(error) => return SendOutcome::failed(format!("SMTP setup failed: {}", error)),
        };

        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => return SendOutcome::failed("SMTP connection verification failed"),
            Err(error) => {
                tracing::error!(provider = %self.provider, %error, "SMTP verification failed");
                return SendOutcome::failed(format!("SMTP verification failed: {}", error));
            }
        }

        match transport.send(message).await {
            Ok(response) => {
                tracing::info!(provider = %self.provider, to = %outgoing.to, "SMTP send accepted");
                match response.message().next() {
                    Some(line) => SendOutcome::sent(line.to_string()),
                    None => SendOutcome::accepted(),
                }
            }
            Err(error) => {
                tracing::error!(provider = %self.provider, %error, "SMTP send failed");
                SendOutcome::failed(format!("SMTP send failed: {}", error))
            }
        }
    }
}

/// Replaces HTML tags with spaces and collapses the resulting whitespace.
pub(crate) fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailSettings;

    #[test]
    fn endpoint_presets() {
        assert_eq!(SmtpEndpoint::gmail().host, "smtp.gmail.com");
        assert_eq!(SmtpEndpoint::gmail().port, 587);
        assert_eq!(SmtpEndpoint::outlook().host, "smtp-mail.outlook.com");
        assert_eq!(
            SmtpEndpoint::for_provider(ProviderKind::Outlook),
            SmtpEndpoint::outlook()
        );
    }

    #[test]
    fn strip_tags_flattens_markup() {
        assert_eq!(
            strip_tags("<p>Hello <b>world</b></p>\n<p>Bye</p>"),
            "Hello world Bye"
        );
        assert_eq!(strip_tags("no markup"), "no markup");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn status_reflects_credentials() {
        let mut settings = MailSettings::default();
        let mailer = SmtpMailer::for_provider(ProviderKind::Gmail, &settings);
        assert!(!mailer.status().configured);

        settings.gmail.smtp = SmtpCredentials::new("user@gmail.com", "app-password");
        let mailer = SmtpMailer::for_provider(ProviderKind::Gmail, &settings);
        assert!(mailer.status().configured);
        assert_eq!(mailer.status().provider, ProviderKind::Gmail);
    }

    #[tokio::test]
    async fn send_without_credentials_fails_fast() {
        let mailer = SmtpMailer::for_provider(ProviderKind::Gmail, &MailSettings::default());
        let outcome = mailer
            .send(&OutgoingMessage::plain_text("a@b.com", "s", "b"))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("SMTP credentials not configured"));
    }

    #[tokio::test]
    async fn verify_without_credentials_fails_fast() {
        let mailer = SmtpMailer::for_provider(ProviderKind::Outlook, &MailSettings::default());
        let outcome = mailer.verify().await;
        assert!(!outcome.success);
    }
}
