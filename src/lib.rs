//! Hydra Chat Widget
//!
//! A chat widget controller for the Hydra trading assistant. It sends text
//! and chart images to a chat backend, renders the conversation, previews a
//! staged image and keeps a connection badge fresh from a health endpoint.
//!
//! # Architecture
//!
//! - **Controller**: [`widget::ChatWidget`] owns the UI state and drives the
//!   backend calls
//! - **Document model**: [`view::ChatView`] is what the page shows, rendered
//!   to HTML through the leptos components in [`render`]
//! - **Backend**: [`backend::ChatBackend`] abstracts `/chat`,
//!   `/clear_history` and `/health`; [`backend::HttpBackend`] is the
//!   `reqwest` implementation
//! - **Front end**: [`terminal`] drives the widget from a line-based console
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hydra_chat_widget::{ChatWidget, HttpBackend, WidgetConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WidgetConfig::default();
//! let backend = HttpBackend::new(&config.backend.base_url, None)?;
//! let widget = ChatWidget::new(Arc::new(backend), &config);
//! widget.start();
//!
//! widget.set_input("Analyze SPY on the daily");
//! widget.send_message().await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod message;
pub mod render;
pub mod telemetry;
pub mod terminal;
pub mod upload;
pub mod view;
pub mod widget;

pub use backend::{ChatBackend, ChatRequest, HttpBackend};
pub use config::WidgetConfig;
pub use error::WidgetError;
pub use widget::{ChatWidget, SendOutcome, SendPhase};
