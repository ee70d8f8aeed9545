use crate::{DrawingArtifact, GenerationError, GenerationResult, InlineImage};
use base64::Engine as _;

const DATA_URL_PREFIX: &str = "data:";

/// Decode a `data:<mime>;base64,<payload>` URL.
/// Returns `None` when the URL is not a data URL.
pub fn decode_data_url(url: &str) -> Option<GenerationResult<InlineImage>> {
    let rest = url.strip_prefix(DATA_URL_PREFIX)?;
    Some(decode_data_url_body(rest))
}

fn decode_data_url_body(rest: &str) -> GenerationResult<InlineImage> {
    let (header, payload) = rest.split_once(',').ok_or_else(|| {
        GenerationError::InvalidInput("Data URL is missing the ',' separator".to_string())
    })?;

    let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
        GenerationError::InvalidInput("Only base64 data URLs are supported".to_string())
    })?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| GenerationError::InvalidInput(format!("Failed to decode base64: {e}")))?;

    Ok(InlineImage {
        mime_type: if mime_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            mime_type.to_string()
        },
        bytes,
    })
}

impl DrawingArtifact {
    /// The drawing bytes when the backend returned the image inline.
    #[must_use]
    pub fn inline_image(&self) -> Option<GenerationResult<InlineImage>> {
        decode_data_url(&self.image_url)
    }
}
