//! The widget's document model.
//!
//! [`ChatView`] holds what the page shows: the chat log, the input box, the
//! image preview, the typing indicator, the error modal, the connection badge
//! and the clock. The controller mutates it; [`ChatView::render`] serializes
//! it through the components in [`crate::render`].

use leptos::prelude::*;

use crate::message::Message;
use crate::render::{self, WidgetShell};

/// Last observed health-check outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Connection badge. Shows no text until the first health check completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionIndicator {
    pub status: ConnectionStatus,
    pub checked: bool,
}

impl ConnectionIndicator {
    pub fn set(&mut self, status: ConnectionStatus) {
        self.status = status;
        self.checked = true;
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.checked { self.status.label() } else { "" }
    }

    #[must_use]
    pub fn css_class(&self) -> String {
        if self.checked {
            format!("connection-status {}", self.status.css_class())
        } else {
            "connection-status".to_string()
        }
    }
}

/// Where a click on the error modal landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalClickTarget {
    /// The dimmed background outside the dialog.
    Overlay,
    /// Anywhere inside the dialog content.
    Dialog,
}

/// The single shared error overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorModal {
    pub visible: bool,
    pub message: String,
}

impl ErrorModal {
    /// Show `message`, replacing any error already on screen.
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Close only when the click hit the overlay itself.
    pub fn click(&mut self, target: ModalClickTarget) {
        if target == ModalClickTarget::Overlay {
            self.close();
        }
    }
}

/// Image preview area above the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPreview {
    pub visible: bool,
    /// `src` of the preview image; empty when cleared.
    pub src: String,
}

/// One child of the chat container.
#[derive(Debug, Clone)]
pub enum ChatEntry {
    Welcome,
    Message(Message),
}

/// Everything the widget displays.
#[derive(Debug, Clone)]
pub struct ChatView {
    /// Children of the chat container, oldest first.
    pub chat_log: Vec<ChatEntry>,
    /// Name shown in the welcome block.
    pub trader_name: String,
    pub input_text: String,
    /// Display value of the file input; emptied when the preview is cleared.
    pub file_input: String,
    pub send_enabled: bool,
    pub preview: UploadPreview,
    pub typing_visible: bool,
    pub modal: ErrorModal,
    pub connection: ConnectionIndicator,
    pub clock_text: String,
    /// Number of times the log was scrolled to the bottom.
    pub scroll_count: u64,
}

impl ChatView {
    #[must_use]
    pub fn new(trader_name: impl Into<String>) -> Self {
        Self {
            chat_log: Vec::new(),
            trader_name: trader_name.into(),
            input_text: String::new(),
            file_input: String::new(),
            send_enabled: false,
            preview: UploadPreview::default(),
            typing_visible: false,
            modal: ErrorModal::default(),
            connection: ConnectionIndicator::default(),
            clock_text: String::new(),
            scroll_count: 0,
        }
    }

    /// Replace the chat log with the welcome block alone.
    pub fn reset_to_welcome(&mut self) {
        self.chat_log.clear();
        self.chat_log.push(ChatEntry::Welcome);
    }

    pub fn append(&mut self, message: Message) {
        self.chat_log.push(ChatEntry::Message(message));
        self.scroll_to_bottom();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_count += 1;
    }

    /// Chat entries excluding the welcome block.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.chat_log.iter().filter_map(|entry| match entry {
            ChatEntry::Message(message) => Some(message),
            ChatEntry::Welcome => None,
        })
    }

    /// Render the whole widget to HTML.
    #[must_use]
    pub fn render(&self) -> String {
        let state = self.clone();
        render::to_html(move || view! { <WidgetShell state=state /> })
    }
}
