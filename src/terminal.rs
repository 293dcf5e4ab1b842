//! Line-oriented front end for the widget.
//!
//! Each input line is one user action. Plain text is typed into the input
//! box and sent; lines starting with `/` are commands:
//!
//! | Command          | Action                           |
//! |------------------|----------------------------------|
//! | `/image PATH`    | stage an image                   |
//! | `/remove-image`  | clear the staged image           |
//! | `/clear`         | clear conversation history       |
//! | `/status`        | print connection badge and clock |
//! | `/html`          | print the rendered widget        |
//! | `/quit`          | exit                             |
//!
//! After every action, new chat entries and any error are printed.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::message::{Message, Sender, format_local_time};
use crate::render::WELCOME_PROMPT;
use crate::upload::ImageFile;
use crate::view::{ChatEntry, ModalClickTarget};
use crate::widget::ChatWidget;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Image(PathBuf),
    RemoveImage,
    Clear,
    Status,
    Html,
    Quit,
    Unknown(String),
}

impl Command {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));
        match name {
            "image" if !arg.is_empty() => Self::Image(PathBuf::from(arg)),
            "remove-image" => Self::RemoveImage,
            "clear" => Self::Clear,
            "status" => Self::Status,
            "html" => Self::Html,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Prints the widget's chat log incrementally.
#[derive(Debug)]
pub struct Terminal<W> {
    widget: ChatWidget,
    out: W,
    printed: usize,
}

impl<W: Write> Terminal<W> {
    pub fn new(widget: ChatWidget, out: W) -> Self {
        Self {
            widget,
            out,
            printed: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Read commands until EOF or `/quit`.
    pub async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.flush_view()?;
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if !self.handle(Command::parse(&line)).await? {
                break;
            }
        }
        Ok(())
    }

    /// Apply one command. Returns `false` when the session should end.
    pub async fn handle(&mut self, command: Command) -> std::io::Result<bool> {
        match command {
            Command::Send(text) => {
                self.widget.set_input(text);
                self.widget.press_enter().await;
            }
            Command::Image(path) => match ImageFile::from_path(&path).await {
                Ok(file) => {
                    let name = file.name.clone();
                    if self.widget.handle_image_upload(file).await {
                        writeln!(self.out, "[image staged: {name}]")?;
                    }
                }
                Err(e) => writeln!(self.out, "[cannot read {}: {e}]", path.display())?,
            },
            Command::RemoveImage => self.widget.clear_image_preview(),
            Command::Clear => {
                let _ = self.widget.clear_conversation_history().await;
            }
            Command::Status => {
                let view = self.widget.view();
                writeln!(
                    self.out,
                    "[{}] {}",
                    view.connection.status.label(),
                    view.clock_text
                )?;
            }
            Command::Html => writeln!(self.out, "{}", self.widget.view().render())?,
            Command::Quit => return Ok(false),
            Command::Unknown(cmd) => writeln!(self.out, "[unknown command: {cmd}]")?,
        }
        self.flush_view()?;
        Ok(true)
    }

    fn flush_view(&mut self) -> std::io::Result<()> {
        let view = self.widget.view();
        if view.chat_log.len() < self.printed {
            self.printed = 0;
        }
        for entry in &view.chat_log[self.printed..] {
            writeln!(self.out, "{}", describe(entry, &view.trader_name))?;
        }
        self.printed = view.chat_log.len();

        if view.modal.visible {
            writeln!(self.out, "!! {}", view.modal.message)?;
            self.widget.click_error_modal(ModalClickTarget::Overlay);
        }
        self.out.flush()
    }
}

/// Plain-text rendering of a chat log entry. Bot replies are printed as
/// received, before formatting.
fn describe(entry: &ChatEntry, trader_name: &str) -> String {
    let message: &Message = match entry {
        ChatEntry::Welcome => {
            return format!("Welcome to {trader_name}\n{WELCOME_PROMPT}");
        }
        ChatEntry::Message(message) => message,
    };

    let time = format_local_time(&message.timestamp);
    let text = message.text.as_deref().unwrap_or_default();
    match message.sender {
        Sender::User => {
            let image = if message.image.is_some() { " [image]" } else { "" };
            format!("[{time}] you> {text}{image}")
        }
        Sender::Bot => format!("[{time}] bot> {text}"),
    }
}
