//! Image staging for the upload preview.
//!
//! A picked file is only staged when its declared media type is an image.
//! Staging decodes the bytes into a `data:` URI off the async runtime so the
//! preview and the optimistic user message can show it without a fetch.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A file chosen through the image input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name sent with the multipart `image` field.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its media type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    /// Whether the declared media type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// An image held client-side until it is sent or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub file: ImageFile,
    /// Displayable `data:` URI of the file.
    pub data_uri: String,
}

impl StagedImage {
    /// Decode `file` for display.
    ///
    /// Returns `None` for non-image files.
    pub async fn decode(file: ImageFile) -> Option<Self> {
        if !file.is_image() {
            tracing::debug!(
                name: "upload.rejected",
                media_type = %file.media_type,
                "Ignoring non-image upload"
            );
            return None;
        }

        let (file, data_uri) = tokio::task::spawn_blocking(move || {
            let uri = to_data_uri(&file.media_type, &file.bytes);
            (file, uri)
        })
        .await
        .map_err(|e| tracing::warn!(name: "upload.decode_failed", error = %e, "Image decode task failed"))
        .ok()?;

        Some(Self { file, data_uri })
    }
}

/// Encode bytes as a base64 `data:` URI.
#[must_use]
pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}
