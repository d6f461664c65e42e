//! PDF text layer: per-page text runs via pdf-extract.

use tracing::debug;

use crate::extraction::ExtractionError;

/// Reads the embedded text layer of a PDF, one string per page in page order.
///
/// An image-only page yields an empty string, so the returned length is the page count.
pub trait TextLayerReader: Send + Sync {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Production reader backed by the `pdf-extract` crate.
pub struct PdfExtractReader;

impl TextLayerReader for PdfExtractReader {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractionError::ExtractionFailed(format!("PDF parse error: {e}")))?;
        debug!("pdf-extract returned {} pages", pages.len());
        Ok(pages)
    }
}

/// Joins a page's text runs with single spaces.
pub fn collapse_runs(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Page-ordered, blank-line-separated concatenation of non-empty pages, trimmed.
pub fn join_text_layer(pages: &[String]) -> String {
    let mut full_text = String::new();
    for page in pages {
        let page_text = collapse_runs(page);
        if page_text.is_empty() {
            continue;
        }
        full_text.push_str(&page_text);
        full_text.push_str("\n\n");
    }
    full_text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collapse_runs_single_spaces() {
        assert_eq!(collapse_runs("  Rust \t\n  Engineer  "), "Rust Engineer");
        assert_eq!(collapse_runs("\n\n"), "");
    }

    #[test]
    fn test_join_preserves_page_order() {
        let joined = join_text_layer(&pages(&["first page", "second page", "third page"]));
        assert_eq!(joined, "first page\n\nsecond page\n\nthird page");
    }

    #[test]
    fn test_join_skips_blank_pages() {
        let joined = join_text_layer(&pages(&["", "Experience", "  ", "Education"]));
        assert_eq!(joined, "Experience\n\nEducation");
    }

    #[test]
    fn test_join_all_blank_is_empty() {
        assert!(join_text_layer(&pages(&["", "\n", " "])).is_empty());
        assert!(join_text_layer(&[]).is_empty());
    }

    #[test]
    fn test_pdf_extract_reader_rejects_garbage() {
        let err = PdfExtractReader.read_pages(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }
}
