use std::sync::Arc;

use async_trait::async_trait;

use hydra_chat_widget::error::Result;
use hydra_chat_widget::terminal::Terminal;
use hydra_chat_widget::{ChatBackend, ChatRequest, ChatWidget, WidgetConfig, WidgetError};

/// Echoes the message back; refuses images named `bad.png`.
struct EchoBackend;

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn send_chat(&self, request: ChatRequest) -> Result<String> {
        if request.image.as_ref().is_some_and(|i| i.name == "bad.png") {
            return Err(WidgetError::Application("Unreadable chart".into()));
        }
        Ok(format!("**echo** {}", request.message.unwrap_or_default()))
    }

    async fn clear_history(&self) -> Result<()> {
        Ok(())
    }

    async fn check_health(&self) -> Result<()> {
        Err(WidgetError::Network("offline".into()))
    }
}

async fn run(script: &str) -> (String, ChatWidget) {
    let widget = ChatWidget::new(Arc::new(EchoBackend), &WidgetConfig::default());
    let mut terminal = Terminal::new(widget.clone(), Vec::new());
    terminal.run(script.as_bytes()).await.unwrap();
    (String::from_utf8(terminal.into_inner()).unwrap(), widget)
}

#[tokio::test]
async fn test_transcript_shows_both_sides() {
    let (out, _) = run("hello there\n").await;

    assert!(out.starts_with("Welcome to Hydra"));
    assert!(out.contains("you> hello there"));
    assert!(out.contains("bot> **echo** hello there"));
}

#[tokio::test]
async fn test_quit_stops_reading() {
    let (out, widget) = run("/quit\nnever sent\n").await;

    assert!(!out.contains("never sent"));
    assert_eq!(widget.view().messages().count(), 0);
}

#[tokio::test]
async fn test_clear_reprints_welcome() {
    let (out, widget) = run("one\n/clear\n").await;

    assert_eq!(out.matches("Welcome to Hydra").count(), 2);
    assert_eq!(widget.view().chat_log.len(), 1);
}

#[tokio::test]
async fn test_image_errors_surface_once() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, [1, 2, 3]).unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "text").unwrap();

    let script = format!("/image {}\n/image {}\nlook\n", notes.display(), bad.display());
    let (out, widget) = run(&script).await;

    assert!(!out.contains("[image staged: notes.txt]"));
    assert!(out.contains("[image staged: bad.png]"));
    assert!(out.contains("you> look [image]"));
    assert_eq!(out.matches("!! Error: Unreadable chart").count(), 1);
    assert!(!widget.view().modal.visible);
}

#[tokio::test]
async fn test_status_and_unknown_commands() {
    let (out, _) = run("/status\n/bogus\n").await;

    assert!(out.contains("[Disconnected] "));
    assert!(out.contains("[unknown command: /bogus]"));
}
