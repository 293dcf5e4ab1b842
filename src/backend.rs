//! HTTP calls the widget makes.
//!
//! [`ChatBackend`] is the seam between the controller and the network so the
//! controller can be exercised against scripted backends. [`HttpBackend`]
//! talks to the real endpoints with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use crate::error::{Result, WidgetError};
use crate::upload::ImageFile;

/// Body of one `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    /// Trimmed text, if any.
    pub message: Option<String>,
    pub image: Option<ImageFile>,
}

impl ChatRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.image.is_none()
    }

    fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        if let Some(message) = self.message {
            form = form.text("message", message);
        }
        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.name)
                .mime_str(&image.media_type)
                .map_err(|e| WidgetError::Network(format!("invalid image type: {e}")))?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

/// JSON body returned by `POST /chat`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatReply {
    /// Classify a successfully received body.
    ///
    /// An `error` field wins over `response`. A body with neither is treated
    /// like a transport failure.
    pub fn into_result(self) -> Result<String> {
        match (self.error, self.response) {
            (Some(error), _) if !error.is_empty() => Err(WidgetError::Application(error)),
            (_, Some(response)) => Ok(response),
            _ => Err(WidgetError::Network(
                "malformed response: missing `response` field".into(),
            )),
        }
    }
}

/// The three endpoints the widget depends on.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /chat`. Returns the bot's reply text.
    async fn send_chat(&self, request: ChatRequest) -> Result<String>;

    /// `POST /clear_history`. The body is ignored.
    async fn clear_history(&self) -> Result<()>;

    /// `GET /health`. Any 2xx is healthy.
    async fn check_health(&self) -> Result<()>;
}

/// [`ChatBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url`.
    ///
    /// Requests carry no timeout unless one is given.
    pub fn new(base_url: impl AsRef<str>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| WidgetError::Network(format!("invalid backend URL: {e}")))?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { base_url, http })
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| WidgetError::Network(format!("invalid backend URL: {e}")))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    fn ensure_success(response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(WidgetError::Http {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, request: ChatRequest) -> Result<String> {
        let form = request.into_form()?;
        let response = self
            .http
            .post(self.url("/chat"))
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(&response)?;

        let body = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&body)?;
        reply.into_result()
    }

    async fn clear_history(&self) -> Result<()> {
        let response = self.http.post(self.url("/clear_history")).send().await?;
        Self::ensure_success(&response)
    }

    async fn check_health(&self) -> Result<()> {
        let response = self.http.get(self.url("/health")).send().await?;
        Self::ensure_success(&response)
    }
}
