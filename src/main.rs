//! postdesk - Mailbox diagnostic entry point
//!
//! Prints the active provider, SMTP credential state, and a listing of
//! the inbox. Useful for checking a deployment's environment wiring.

use anyhow::Result;
use postdesk::EmailService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting postdesk");

    let service = EmailService::from_env();

    let info = service.provider_info();
    println!("Provider: {} ({})", info.display_name, info.description);
    println!(
        "Credentials: {}",
        if info.available { "configured" } else { "missing (demo data)" }
    );

    let smtp = service.smtp_status();
    println!(
        "SMTP relay: {}",
        if smtp.configured { "configured" } else { "not configured" }
    );

    let inbox = service.fetch_inbox(10).await?;
    println!("Inbox: {} messages, {} unread", inbox.total, inbox.unread);
    for message in &inbox.messages {
        println!(
            "  [{}] {} - {}",
            if message.is_read { " " } else { "*" },
            message.from.display(),
            message.subject
        );
    }

    Ok(())
}
