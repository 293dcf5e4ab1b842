//! Hydra chat widget console.
//!
//! Entry point that wires configuration, logging and the HTTP backend to a
//! widget driven from stdin.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;

use hydra_chat_widget::terminal::Terminal;
use hydra_chat_widget::{ChatWidget, HttpBackend, WidgetConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    telemetry::init();

    let config = WidgetConfig::load().context("Configuration error")?;

    info!(
        name: "widget.config.loaded",
        base_url = %config.backend.base_url,
        trader = %config.ui.trader_name,
        "Widget configuration loaded"
    );

    let backend = HttpBackend::new(
        &config.backend.base_url,
        config.backend.request_timeout(),
    )
    .context("Failed to create backend client")?;

    let widget = ChatWidget::new(Arc::new(backend), &config);
    widget.start();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut terminal = Terminal::new(widget, std::io::stdout());
    terminal.run(stdin).await.context("Console I/O failed")?;

    info!(name: "widget.stopped", "Widget session ended");
    Ok(())
}
