//! Chat messages as shown in the log.

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::upload::StagedImage;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A rendered-once chat entry. Never persisted.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub text: Option<String>,
    /// Image the user attached, rendered from its local data URI.
    pub image: Option<StagedImage>,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// A message from the user, stamped now. Empty text counts as absent.
    pub fn user(text: Option<String>, image: Option<StagedImage>) -> Self {
        Self::new(text.filter(|t| !t.is_empty()), image, Sender::User)
    }

    /// A reply from the bot, stamped now.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()), None, Sender::Bot)
    }

    fn new(text: Option<String>, image: Option<StagedImage>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            image,
            sender,
            timestamp: Local::now(),
        }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Format a time the way the widget shows it, e.g. `3:04:05 PM`.
#[must_use]
pub fn format_local_time(time: &DateTime<Local>) -> String {
    time.format("%-I:%M:%S %p").to_string()
}
