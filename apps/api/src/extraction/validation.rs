//! Upload validation: runs before any parsing.

use crate::extraction::{Document, ExtractionError, MediaType};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Checks the declared type against the allow-list and the size ceiling,
/// returning a `Document` ready for extraction.
pub fn validate_upload(
    declared_mime: &str,
    bytes: bytes::Bytes,
    max_bytes: usize,
) -> Result<Document, ExtractionError> {
    let media_type = MediaType::from_mime(declared_mime)?;
    if bytes.len() > max_bytes {
        return Err(ExtractionError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    Ok(Document::new(media_type, bytes))
}
