//! Uploaded resumes and the per-user "current resume" pointer.

pub mod handlers;
pub mod store;

use crate::extraction::char_len;

/// Shortest transcript accepted as a resume.
pub const MIN_RESUME_CHARS: usize = 100;

pub const TOO_SHORT_MESSAGE: &str =
    "The extracted text is too short. Please ensure your resume contains meaningful content.";

/// Whether an extracted transcript is long enough to store.
pub fn is_meaningful(text: &str) -> bool {
    char_len(text.trim()) >= MIN_RESUME_CHARS
}
