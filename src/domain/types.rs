//! Core identifier and selection types.
//!
//! These newtype wrappers provide type safety for vendor-assigned identifiers,
//! preventing accidental mixing of different ID types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an individual email message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailId(pub String);

impl EmailId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EmailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Unique identifier for an email thread (conversation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Which mail vendor a provider speaks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Gmail REST API.
    #[default]
    Gmail,
    /// Microsoft Graph (Outlook) REST API.
    Outlook,
}

impl ProviderKind {
    /// Parses a configuration value.
    ///
    /// Only `"outlook"` (case-insensitive) selects Outlook; every other
    /// value, including empty or unrecognized strings, selects Gmail.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("outlook") {
            Self::Outlook
        } else {
            Self::Gmail
        }
    }

    /// Human-readable vendor name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gmail => "Gmail",
            Self::Outlook => "Outlook",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gmail => write!(f, "gmail"),
            Self::Outlook => write!(f, "outlook"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_id_display() {
        let id = EmailId("msg-19428".to_string());
        assert_eq!(id.to_string(), "msg-19428");
    }

    #[test]
    fn thread_id_equality() {
        let id1 = ThreadId::from("thread-1");
        let id2 = ThreadId::from("thread-1".to_string());
        assert_eq!(id1, id2);
    }

    #[test]
    fn email_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(EmailId::from("email-1"));
        assert!(set.contains(&EmailId::from("email-1")));
    }

    #[test]
    fn provider_kind_parse_outlook() {
        assert_eq!(ProviderKind::parse("outlook"), ProviderKind::Outlook);
        assert_eq!(ProviderKind::parse("Outlook"), ProviderKind::Outlook);
        assert_eq!(ProviderKind::parse("  OUTLOOK  "), ProviderKind::Outlook);
    }

    #[test]
    fn provider_kind_parse_everything_else_is_gmail() {
        assert_eq!(ProviderKind::parse("gmail"), ProviderKind::Gmail);
        assert_eq!(ProviderKind::parse(""), ProviderKind::Gmail);
        assert_eq!(ProviderKind::parse("exchange"), ProviderKind::Gmail);
    }

    #[test]
    fn provider_kind_default_is_gmail() {
        assert_eq!(ProviderKind::default(), ProviderKind::Gmail);
    }

    #[test]
    fn provider_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ProviderKind::Outlook).unwrap();
        assert_eq!(json, "\"outlook\"");
    }
}
