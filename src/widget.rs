//! The chat widget controller.
//!
//! [`ChatWidget`] owns the UI state (send phase, staged image and the
//! [`ChatView`]) and drives the three backend calls. Handles are cheap to
//! clone and share one widget; separate [`ChatWidget::new`] calls give fully
//! independent widgets.
//!
//! # Sending
//!
//! A send moves the widget from [`SendPhase::Idle`] to [`SendPhase::Sending`]
//! and back. While sending, further sends are dropped rather than queued.
//! Requests are never retried or cancelled, and without a configured timeout
//! a hung request keeps the widget in `Sending`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::backend::{ChatBackend, ChatRequest};
use crate::config::WidgetConfig;
use crate::error::{Result, WidgetError};
use crate::message::{Message, format_local_time};
use crate::upload::{ImageFile, StagedImage};
use crate::view::{ChatView, ConnectionStatus, ModalClickTarget};

/// Whether a send is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendPhase {
    #[default]
    Idle,
    Sending,
}

/// What became of a send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Another send was in flight; nothing happened.
    Busy,
    /// No text and no staged image; nothing happened.
    Empty,
    /// The bot's reply was appended.
    Delivered,
    /// The request failed and the error modal is showing.
    Failed(WidgetError),
}

#[derive(Debug)]
struct WidgetState {
    phase: SendPhase,
    staged: Option<StagedImage>,
    view: ChatView,
}

impl WidgetState {
    fn update_send_button_state(&mut self) {
        self.view.send_enabled =
            !self.view.input_text.trim().is_empty() || self.staged.is_some();
    }

    fn clear_image_preview(&mut self) {
        self.view.preview.src.clear();
        self.view.preview.visible = false;
        self.view.file_input.clear();
        self.staged = None;
        self.update_send_button_state();
    }

    fn add_message(&mut self, message: Message) {
        self.view.append(message);
    }
}

struct Inner {
    backend: Arc<dyn ChatBackend>,
    clock_interval: Duration,
    health_interval: Duration,
    state: Mutex<WidgetState>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timers = self
            .timers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for handle in timers.drain(..) {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inner")
            .field("clock_interval", &self.clock_interval)
            .field("health_interval", &self.health_interval)
            .finish_non_exhaustive()
    }
}

/// Handle to a chat widget.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    inner: Arc<Inner>,
}

impl ChatWidget {
    /// Create a widget showing the welcome message. Timers are not running
    /// until [`ChatWidget::start`].
    pub fn new(backend: Arc<dyn ChatBackend>, config: &WidgetConfig) -> Self {
        let mut view = ChatView::new(config.ui.trader_name.clone());
        view.reset_to_welcome();

        let mut state = WidgetState {
            phase: SendPhase::Idle,
            staged: None,
            view,
        };
        state.update_send_button_state();

        Self {
            inner: Arc::new(Inner {
                backend,
                clock_interval: config.timers.clock_interval(),
                health_interval: config.timers.health_interval(),
                state: Mutex::new(state),
                timers: Mutex::new(Vec::new()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, WidgetState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of what the widget currently displays.
    #[must_use]
    pub fn view(&self) -> ChatView {
        self.state().view.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SendPhase {
        self.state().phase
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.phase() == SendPhase::Sending
    }

    #[must_use]
    pub fn staged_image(&self) -> Option<StagedImage> {
        self.state().staged.clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Timers
    // ─────────────────────────────────────────────────────────────────────

    /// Start the clock and connection timers.
    ///
    /// Both fire immediately, then repeat. A tick that comes due late is not
    /// replayed; the schedule restarts from the late tick. They run until the
    /// last handle to this widget is dropped. Calling this again has no
    /// effect.
    pub fn start(&self) {
        let mut timers = self
            .inner
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !timers.is_empty() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.clock_interval;
        timers.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(widget) = Self::upgrade(&weak) else {
                    break;
                };
                widget.tick_clock();
            }
        }));

        let weak = Arc::downgrade(&self.inner);
        let backend = Arc::clone(&self.inner.backend);
        let period = self.inner.health_interval;
        timers.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if weak.strong_count() == 0 {
                    break;
                }
                // Checks may overlap when the backend is slow. An in-flight
                // check holds only the backend; the widget is looked up again
                // once it answers.
                let backend = Arc::clone(&backend);
                let weak = Weak::clone(&weak);
                tokio::spawn(async move {
                    let status = poll_health(backend.as_ref()).await;
                    if let Some(widget) = Self::upgrade(&weak) {
                        widget.set_connection_status(status);
                    }
                });
            }
        }));

        info!(
            name: "widget.timers.started",
            clock_ms = self.inner.clock_interval.as_millis(),
            health_ms = self.inner.health_interval.as_millis(),
            "Widget timers started"
        );
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Write the current local time into the clock.
    pub fn tick_clock(&self) {
        let text = format!("System Time: {}", format_local_time(&Local::now()));
        self.state().view.clock_text = text;
    }

    /// Poll `/health` and update the connection badge.
    pub async fn check_connection_status(&self) -> ConnectionStatus {
        let status = poll_health(self.inner.backend.as_ref()).await;
        self.set_connection_status(status);
        status
    }

    fn set_connection_status(&self, status: ConnectionStatus) {
        self.state().view.connection.set(status);
        debug!(name: "health.checked", status = status.label(), "Connection status updated");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────

    /// The text input changed.
    pub fn set_input(&self, text: impl Into<String>) {
        let mut state = self.state();
        state.view.input_text = text.into();
        state.update_send_button_state();
    }

    /// Enable the send button iff there is trimmed text or a staged image.
    pub fn update_send_button_state(&self) {
        self.state().update_send_button_state();
    }

    /// Enter was pressed in the text input.
    pub async fn press_enter(&self) -> SendOutcome {
        if self.is_processing() {
            return SendOutcome::Busy;
        }
        self.send_message().await
    }

    /// A file was picked in the image input.
    ///
    /// Non-image files are ignored without any message. Returns whether the
    /// file was staged.
    pub async fn handle_image_upload(&self, file: ImageFile) -> bool {
        let Some(staged) = StagedImage::decode(file).await else {
            return false;
        };

        let mut state = self.state();
        state.view.preview.src = staged.data_uri.clone();
        state.view.preview.visible = true;
        state.view.file_input = staged.file.name.clone();
        debug!(
            name: "upload.staged",
            file = %staged.file.name,
            bytes = staged.file.bytes.len(),
            "Image staged"
        );
        state.staged = Some(staged);
        state.update_send_button_state();
        true
    }

    /// Remove the staged image and hide the preview.
    pub fn clear_image_preview(&self) {
        self.state().clear_image_preview();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────

    /// Send the current text and staged image to `/chat`.
    pub async fn send_message(&self) -> SendOutcome {
        let request = {
            let mut state = self.state();
            if state.phase == SendPhase::Sending {
                debug!(name: "widget.send.dropped", "Send already in flight");
                return SendOutcome::Busy;
            }
            let text = state.view.input_text.trim().to_owned();
            if text.is_empty() && state.staged.is_none() {
                return SendOutcome::Empty;
            }

            state.phase = SendPhase::Sending;
            state.view.typing_visible = true;

            let image = state.staged.clone();
            state.add_message(Message::user(Some(text.clone()), image.clone()));

            ChatRequest {
                message: (!text.is_empty()).then_some(text),
                image: image.map(|staged| staged.file),
            }
        };

        info!(
            name: "widget.send.started",
            has_text = request.message.is_some(),
            has_image = request.image.is_some(),
            "Sending chat message"
        );

        let result = self.inner.backend.send_chat(request).await;

        let mut state = self.state();
        let outcome = match result {
            Ok(reply) => {
                state.add_message(Message::bot(reply));
                state.clear_image_preview();
                state.view.input_text.clear();
                info!(name: "widget.send.completed", "Bot reply rendered");
                SendOutcome::Delivered
            }
            Err(err) => {
                warn!(name: "widget.send.failed", kind = err.kind(), error = %err, "Chat request failed");
                state.view.modal.show(format!("Error: {err}"));
                SendOutcome::Failed(err)
            }
        };

        state.phase = SendPhase::Idle;
        state.view.typing_visible = false;
        state.update_send_button_state();
        state.view.scroll_to_bottom();
        outcome
    }

    /// Render a message into the chat log and scroll to it.
    pub fn add_message_to_chat(
        &self,
        content: Option<String>,
        image: Option<StagedImage>,
        is_user: bool,
    ) {
        let message = if is_user {
            Message::user(content, image)
        } else {
            Message::bot(content.unwrap_or_default())
        };
        self.state().add_message(message);
    }

    /// Ask the backend to forget the conversation and reset the log.
    ///
    /// A non-2xx answer is reported as `Failed to clear history`; transport
    /// errors show their own message.
    pub async fn clear_conversation_history(&self) -> Result<()> {
        match self.inner.backend.clear_history().await {
            Ok(()) => {
                self.state().view.reset_to_welcome();
                info!(name: "widget.history.cleared", "Conversation history cleared");
                Ok(())
            }
            Err(err) => {
                warn!(name: "widget.history.clear_failed", kind = err.kind(), error = %err, "Clearing history failed");
                let reason = match &err {
                    WidgetError::Http { .. } => "Failed to clear history".to_string(),
                    other => other.to_string(),
                };
                self.show_error_modal(format!("Error clearing history: {reason}"));
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Error modal
    // ─────────────────────────────────────────────────────────────────────

    pub fn show_error_modal(&self, message: impl Into<String>) {
        self.state().view.modal.show(message);
    }

    pub fn close_error_modal(&self) {
        self.state().view.modal.close();
    }

    /// A click landed on the error modal.
    pub fn click_error_modal(&self, target: ModalClickTarget) {
        self.state().view.modal.click(target);
    }
}

async fn poll_health(backend: &dyn ChatBackend) -> ConnectionStatus {
    match backend.check_health().await {
        Ok(()) => ConnectionStatus::Connected,
        Err(err) => {
            debug!(name: "health.failed", kind = err.kind(), error = %err, "Health check failed");
            ConnectionStatus::Disconnected
        }
    }
}
