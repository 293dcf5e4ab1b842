//! Chat entries and the widget shell as leptos components.
//!
//! Rendering is server-side only. Components build views with `view!` and
//! [`to_html`] serializes them; nothing here touches a live document.

use leptos::prelude::*;

use crate::format::format_bot_response;
use crate::message::{Message, Sender, format_local_time};
use crate::view::{ChatEntry, ChatView};

/// Second line of the welcome block.
pub const WELCOME_PROMPT: &str =
    "Ask for market analysis, trade setups or upload a chart for pattern recognition.";

/// Serialize a view built inside a fresh reactive owner.
pub fn to_html<V: IntoView>(build: impl FnOnce() -> V) -> String {
    Owner::new().with(|| build().to_html())
}

/// A message typed by the user. The text is escaped; an attached image is
/// shown from its local data URI.
#[component]
pub fn UserMessage(message: Message) -> impl IntoView {
    let Message {
        id,
        text,
        image,
        timestamp,
        ..
    } = message;
    let image_class = if image.is_some() {
        "message-image"
    } else {
        "message-image hidden"
    };
    let src = image.map(|staged| staged.data_uri);

    view! {
        <div class="message user-message" data-message-id=id.to_string()>
            <div class="message-content">
                <div class="message-body">
                    <div class="message-text">{text}</div>
                    <div class=image_class>
                        <img src=src />
                    </div>
                </div>
                <div class="message-time">{format_local_time(&timestamp)}</div>
            </div>
        </div>
    }
}

/// A bot reply. The formatted markup is inserted as-is.
#[component]
pub fn BotMessage(message: Message) -> impl IntoView {
    let markup = format_bot_response(message.text.as_deref().unwrap_or_default());

    view! {
        <div class="message bot-message" data-message-id=message.id.to_string()>
            <div class="message-content">
                <div class="message-body">
                    <div class="message-text" inner_html=markup></div>
                </div>
                <div class="message-time">{format_local_time(&message.timestamp)}</div>
            </div>
        </div>
    }
}

/// The static welcome block shown on load and after clearing history.
#[component]
pub fn WelcomeMessage(trader_name: String) -> impl IntoView {
    view! {
        <div class="welcome-message">
            <h2>{format!("Welcome to {trader_name}")}</h2>
            <p>{WELCOME_PROMPT}</p>
        </div>
    }
}

/// Render one chat entry from its role-specific template.
pub fn render_message(message: &Message) -> AnyView {
    let message = message.clone();
    match message.sender {
        Sender::User => view! { <UserMessage message=message /> }.into_any(),
        Sender::Bot => view! { <BotMessage message=message /> }.into_any(),
    }
}

pub fn render_welcome(trader_name: &str) -> AnyView {
    view! { <WelcomeMessage trader_name=trader_name.to_string() /> }.into_any()
}

pub fn render_entry(entry: &ChatEntry, trader_name: &str) -> AnyView {
    match entry {
        ChatEntry::Welcome => render_welcome(trader_name),
        ChatEntry::Message(message) => render_message(message),
    }
}

/// HTML of a single message.
pub fn render_message_html(message: &Message) -> String {
    to_html(|| render_message(message))
}

/// The whole widget, with the element IDs the page's scripts and styles
/// expect.
#[component]
pub fn WidgetShell(state: ChatView) -> impl IntoView {
    let entries = state
        .chat_log
        .iter()
        .map(|entry| render_entry(entry, &state.trader_name))
        .collect::<Vec<_>>();
    let ChatView {
        input_text,
        file_input,
        send_enabled,
        preview,
        typing_visible,
        modal,
        connection,
        clock_text,
        ..
    } = state;

    view! {
        <div class="chat-widget">
            <header class="widget-header">
                <span id="connectionStatus" class=connection.css_class()>
                    {connection.label()}
                </span>
                <span id="systemTime">{clock_text}</span>
                <button id="clearHistoryBtn">"Clear History"</button>
            </header>
            <div id="chatContainer" class="chat-container">
                {entries}
            </div>
            <div id="typingIndicator" class=hidden_unless("typing-indicator", typing_visible)></div>
            <div class="input-area">
                <div id="uploadPreview" style=display(preview.visible)>
                    <img id="previewImage" src=preview.src />
                    <button id="removeImage">"\u{d7}"</button>
                </div>
                <input id="imageInput" type="file" accept="image/*" value=file_input />
                <input id="userInput" type="text" value=input_text />
                <button id="sendButton" disabled=!send_enabled>
                    "Send"
                </button>
            </div>
            <div id="errorModal" class="modal" style=display(modal.visible)>
                <div class="modal-content">
                    <span class="close-button">"\u{d7}"</span>
                    <p id="errorMessage">{modal.message}</p>
                </div>
            </div>
        </div>
    }
}

fn hidden_unless(class: &str, visible: bool) -> String {
    if visible {
        class.to_string()
    } else {
        format!("{class} hidden")
    }
}

fn display(visible: bool) -> &'static str {
    if visible {
        "display: block"
    } else {
        "display: none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{ImageFile, StagedImage};

    fn staged() -> StagedImage {
        StagedImage {
            file: ImageFile::new("c.png", "image/png", vec![1]),
            data_uri: "data:image/png;base64,AQ==".into(),
        }
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render_message_html(&Message::user(Some("<b>hi</b> & bye".into()), None));
        assert!(html.contains(r#"class="message user-message""#));
        assert!(html.contains("&lt;b"));
        assert!(html.contains("&amp; bye"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_user_image_uses_local_data_uri() {
        let html = render_message_html(&Message::user(None, Some(staged())));
        assert!(html.contains(r#"<div class="message-image">"#));
        assert!(html.contains(r#"src="data:image/png;base64,AQ==""#));
    }

    #[test]
    fn test_user_without_image_hides_slot() {
        let html = render_message_html(&Message::user(Some("hi".into()), None));
        assert!(html.contains(r#"class="message-image hidden""#));
        assert!(!html.contains("src="));
    }

    #[test]
    fn test_bot_body_is_formatted_markup() {
        let html = render_message_html(&Message::bot("**up** trend\nConfidence: 70%"));
        assert!(html.contains(r#"class="message bot-message""#));
        assert!(html.contains("<strong>up</strong> trend<br>"));
        assert!(html.contains(r#"<span class="confidence">Confidence: 70%</span>"#));
    }

    #[test]
    fn test_message_carries_id_and_time() {
        let msg = Message::bot("x");
        let html = render_message_html(&msg);
        assert!(html.contains(&format!(r#"data-message-id="{}""#, msg.id)));
        assert!(html.contains(&format!(
            r#"<div class="message-time">{}</div>"#,
            format_local_time(&msg.timestamp)
        )));
    }

    #[test]
    fn test_welcome_names_trader() {
        let html = to_html(|| render_welcome("Hydra"));
        assert!(html.starts_with(r#"<div class="welcome-message">"#));
        assert!(html.contains("<h2>Welcome to Hydra</h2>"));
    }
}
