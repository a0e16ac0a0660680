//! Fixed demo datasets served when no live credential is available.
//!
//! Each vendor adapter substitutes its demo batch when the credential is
//! missing or the vendor answers 401. The sets are deterministic: same
//! ids, same content, same timestamps on every call, so tests and demos
//! are reproducible. Each set holds five messages, two of them unread.

use chrono::{DateTime, Utc};

use crate::domain::{Address, EmailId, EmailMessage, MessageBatch, ThreadId};

fn ts(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// The demo inbox served by the Gmail adapter.
///
/// Mirrors the shape of a Gmail metadata list: snippet and labels only,
/// with the remaining unified fields at their normalization defaults.
pub fn gmail_batch() -> MessageBatch {
    let entries: [(&str, &[&str], &str, i64); 5] = [
        (
            "1",
            &["INBOX", "UNREAD"],
            "Urgent: Contract - Please review and sign ASAP",
            1_732_359_200_000,
        ),
        (
            "2",
            &["INBOX"],
            "Meeting request for next week - Need to confirm availability",
            1_732_272_800_000,
        ),
        (
            "3",
            &["INBOX", "STARRED"],
            "Invoice #1234 - Payment due in 5 days",
            1_732_186_400_000,
        ),
        (
            "4",
            &["INBOX"],
            "Question about the project timeline - Can you clarify?",
            1_732_100_000_000,
        ),
        (
            "5",
            &["INBOX", "UNREAD"],
            "Important: Client feedback received - Need to address",
            1_732_013_600_000,
        ),
    ];

    let messages = entries
        .iter()
        .map(|(id, labels, snippet, millis)| EmailMessage {
            id: EmailId::from(*id),
            thread_id: ThreadId::from(*id),
            from: Address::new("unknown@unknown.com"),
            subject: String::new(),
            snippet: (*snippet).to_string(),
            body: None,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            received_at: ts(*millis),
            is_read: !labels.contains(&"UNREAD"),
            has_attachments: false,
        })
        .collect();

    MessageBatch::new(messages)
}

/// The demo inbox served by the Outlook adapter.
pub fn outlook_batch() -> MessageBatch {
    struct Entry {
        id: &'static str,
        subject: &'static str,
        sender: &'static str,
        from: &'static str,
        body: &'static str,
        category: &'static str,
        millis: i64,
        has_attachments: bool,
        is_read: bool,
    }

    let entries = [
        Entry {
            id: "outlook-1",
            subject: "Urgent: Contract - Please review and sign ASAP",
            sender: "Sarah Johnson",
            from: "sarah.johnson@client.com",
            body: "We need to finalize the contract by end of week. Please review and let me know if you have any questions.",
            category: "Urgent",
            millis: 1_732_359_200_000,
            has_attachments: true,
            is_read: false,
        },
        Entry {
            id: "outlook-2",
            subject: "Meeting Request for Next Week",
            sender: "Michael Chen",
            from: "michael.chen@partner.com",
            body: "Hi, would like to schedule a meeting to discuss the project timeline. Can we meet on Thursday at 2pm?",
            category: "Meeting",
            millis: 1_732_272_800_000,
            has_attachments: false,
            is_read: false,
        },
        Entry {
            id: "outlook-3",
            subject: "Invoice #1234 - Payment Due",
            sender: "Office Supplies Inc.",
            from: "billing@officesupplies.com",
            body: "Thank you for your business! Invoice #1234 for $500.00 is due within 5 days.",
            category: "Finance",
            millis: 1_732_186_400_000,
            has_attachments: true,
            is_read: true,
        },
        Entry {
            id: "outlook-4",
            subject: "Project Update - Week 3",
            sender: "Jennifer Williams",
            from: "jennifer.w@company.com",
            body: "Attached is the weekly project update. Key achievements: completed API integration, deployed to staging, fixed 3 critical bugs.",
            category: "Work",
            millis: 1_732_100_000_000,
            has_attachments: true,
            is_read: true,
        },
        Entry {
            id: "outlook-5",
            subject: "Question About Project Timeline",
            sender: "Alex Thompson",
            from: "alex.thompson@client.com",
            body: "Hi, quick question - can we move the deadline to next month? There might be some delays on our end.",
            category: "Question",
            millis: 1_732_013_600_000,
            has_attachments: false,
            is_read: true,
        },
    ];

    let messages = entries
        .iter()
        .map(|e| EmailMessage {
            id: EmailId::from(e.id),
            thread_id: ThreadId::from(e.id),
            from: Address::with_name(e.from, e.sender),
            subject: e.subject.to_string(),
            snippet: e.body.to_string(),
            body: Some(e.body.to_string()),
            labels: vec![e.category.to_string()],
            received_at: ts(e.millis),
            is_read: e.is_read,
            has_attachments: e.has_attachments,
        })
        .collect();

    MessageBatch::new(messages)
}

/// Body text served for a message when no credential is configured.
pub fn body_placeholder(message_id: &str) -> String {
    format!("Demo message content for {}", message_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmail_batch_has_two_unread_of_five() {
        let batch = gmail_batch();
        assert_eq!(batch.total, 5);
        assert_eq!(batch.unread, 2);
        assert_eq!(
            batch.unread,
            batch.messages.iter().filter(|m| !m.is_read).count()
        );
    }

    #[test]
    fn outlook_batch_has_two_unread_of_five() {
        let batch = outlook_batch();
        assert_eq!(batch.total, 5);
        assert_eq!(batch.unread, 2);
    }

    #[test]
    fn batches_are_stable_across_calls() {
        let first = gmail_batch();
        let second = gmail_batch();
        for (a, b) in first.messages.iter().zip(second.messages.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.snippet, b.snippet);
            assert_eq!(a.received_at, b.received_at);
        }

        let first = outlook_batch();
        let second = outlook_batch();
        for (a, b) in first.messages.iter().zip(second.messages.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.subject, b.subject);
            assert_eq!(a.received_at, b.received_at);
        }
    }

    #[test]
    fn outlook_ids_are_prefixed() {
        let batch = outlook_batch();
        assert!(batch.messages.iter().all(|m| m.id.0.starts_with("outlook-")));
    }

    #[test]
    fn body_placeholder_names_the_message() {
        let body = body_placeholder("msg-7");
        assert!(body.contains("msg-7"));
        assert!(!body.is_empty());
    }
}
