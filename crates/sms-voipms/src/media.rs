//! Image attachments for picture messages.
//!
//! VoIP.ms takes MMS media inline as a data URI string rather than as a file
//! part, so the image is read whole and base64 encoded.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sms_core::SmsError;
use std::path::Path;

/// Media type used when the extension has no known mapping.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Guess the media type from the file extension.
pub fn media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
}

/// `data:<media type>;base64,<payload>`
pub fn data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Read and encode the file on the blocking pool so the async executor never
/// waits on disk.
pub async fn load_data_uri(path: &Path) -> Result<String, SmsError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)
            .map_err(|e| SmsError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(data_uri(&media_type(&path), &bytes))
    })
    .await
    .map_err(|e| SmsError::Unexpected(format!("image encoder task failed: {}", e)))?
}
