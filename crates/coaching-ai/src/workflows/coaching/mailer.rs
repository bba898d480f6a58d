use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

/// Outbound mail hook. One attempt per message; callers decide what a failure means.
pub trait Mailer: Send + Sync {
    fn enabled(&self) -> bool {
        true
    }

    fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail delivery is disabled")]
    Disabled,
    #[error("mail spool write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("mail rejected: {0}")]
    Rejected(String),
}

/// Outcome of the notify stage, reported back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent { to: String },
    Skipped { reason: String },
    Failed { reason: String },
}

/// Writes each message into a spool directory for the relay to pick up.
///
/// Every message produces `<stem>.eml` and, when present, `<stem>-<attachment>`.
#[derive(Debug)]
pub struct OutboxMailer {
    dir: PathBuf,
    from: String,
    sequence: AtomicU64,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
            sequence: AtomicU64::new(1),
        }
    }

    /// `None` when no outbox directory is configured.
    pub fn from_config(config: &MailConfig) -> Option<Self> {
        config
            .outbox_dir
            .as_ref()
            .map(|dir| Self::new(dir.clone(), config.from.clone()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::Rejected("recipient is empty".to_string()));
        }

        fs::create_dir_all(&self.dir)?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stem = format!("{}-{sequence:04}", Utc::now().format("%Y%m%dT%H%M%S"));

        let mut envelope = format!(
            "From: {}\nTo: {}\nSubject: {}\n",
            header_value(&self.from),
            header_value(&message.to),
            header_value(&message.subject)
        );
        if let Some(attachment) = &message.attachment {
            let attachment_name = format!("{stem}-{}", attachment.filename);
            fs::write(self.dir.join(&attachment_name), &attachment.bytes)?;
            envelope.push_str(&format!(
                "X-Attachment: {}; type={}\n",
                header_value(&attachment_name),
                header_value(&attachment.content_type)
            ));
        }
        envelope.push('\n');
        envelope.push_str(&message.body);

        fs::write(self.dir.join(format!("{stem}.eml")), envelope)?;
        Ok(())
    }
}

/// Header values are single lines; control characters become spaces.
fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn enabled(&self) -> bool {
        false
    }

    fn send(&self, _message: &MailMessage) -> Result<(), MailError> {
        Err(MailError::Disabled)
    }
}
