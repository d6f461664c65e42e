//! Text Extraction: turns an uploaded resume into a plain-text transcript.
//!
//! Strategy by media type:
//! - plain text → passthrough, never fails on length
//! - word document → OOXML converter (`docx`)
//! - PDF → text layer first (`pdf`), OCR fallback only when the text layer
//!   yields fewer than `MIN_TEXT_CHARS` characters (`ocr`)
//!
//! The three PDF collaborators sit behind async traits so the fallback
//! ordering can be verified without poppler or tesseract installed.

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod validation;

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::extraction::ocr::{OcrEngine, PageRasterizer, PopplerRasterizer, TesseractEngine};
use crate::extraction::pdf::{PdfExtractReader, TextLayerReader};

/// Below this many characters an extraction is considered to have failed.
pub const MIN_TEXT_CHARS: usize = 50;

/// Upscale factor applied when rasterizing PDF pages for OCR.
pub const OCR_RENDER_SCALE: f32 = 2.0;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_LEGACY_WORD: &str = "application/msword";
pub const MIME_PLAIN_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Please upload PDF or DOCX files.")]
    UnsupportedType(String),

    #[error("File size {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("{0}")]
    ExtractionFailed(String),
}

/// Declared media type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Pdf,
    Docx,
    LegacyWord,
    PlainText,
}

impl MediaType {
    /// Parses a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime: &str) -> Result<Self, ExtractionError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            MIME_PDF => Ok(MediaType::Pdf),
            MIME_DOCX => Ok(MediaType::Docx),
            MIME_LEGACY_WORD => Ok(MediaType::LegacyWord),
            MIME_PLAIN_TEXT => Ok(MediaType::PlainText),
            _ => Err(ExtractionError::UnsupportedType(mime.to_string())),
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => MIME_PDF,
            MediaType::Docx => MIME_DOCX,
            MediaType::LegacyWord => MIME_LEGACY_WORD,
            MediaType::PlainText => MIME_PLAIN_TEXT,
        }
    }
}

/// An uploaded file blob plus its declared media type. Lives for one extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub media_type: MediaType,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(media_type: MediaType, bytes: impl Into<Bytes>) -> Self {
        Self {
            media_type,
            bytes: bytes.into(),
        }
    }
}

/// Which layer of the pipeline produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Passthrough,
    WordDocument,
    TextLayer,
    Ocr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub source: ExtractionSource,
}

/// Result of the two-phase PDF pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfOutcome {
    TextLayer(String),
    Ocr { text: String, pages: usize },
    Failed(String),
}

impl PdfOutcome {
    pub fn into_result(self) -> Result<ExtractedText, ExtractionError> {
        match self {
            PdfOutcome::TextLayer(text) => Ok(ExtractedText {
                text,
                source: ExtractionSource::TextLayer,
            }),
            PdfOutcome::Ocr { text, .. } => Ok(ExtractedText {
                text,
                source: ExtractionSource::Ocr,
            }),
            PdfOutcome::Failed(reason) => Err(ExtractionError::ExtractionFailed(reason)),
        }
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The extraction pipeline. Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct Extractor {
    text_layer: Arc<dyn TextLayerReader>,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrEngine>,
}

impl Extractor {
    pub fn new(
        text_layer: Arc<dyn TextLayerReader>,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            text_layer,
            rasterizer,
            ocr,
        }
    }

    /// Production wiring: pdf-extract, pdftoppm and tesseract.
    pub fn with_system_tools(pdftoppm_bin: &str, tesseract_bin: &str, ocr_language: &str) -> Self {
        Self::new(
            Arc::new(PdfExtractReader),
            Arc::new(PopplerRasterizer::new(pdftoppm_bin)),
            Arc::new(TesseractEngine::new(tesseract_bin, ocr_language)),
        )
    }

    pub async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractionError> {
        match document.media_type {
            MediaType::PlainText => Ok(ExtractedText {
                text: String::from_utf8_lossy(&document.bytes).into_owned(),
                source: ExtractionSource::Passthrough,
            }),
            MediaType::Docx | MediaType::LegacyWord => {
                let bytes = document.bytes.clone();
                let text = tokio::task::spawn_blocking(move || docx::extract_docx_text(&bytes))
                    .await
                    .map_err(|e| {
                        ExtractionError::ExtractionFailed(format!("Word extraction task failed: {e}"))
                    })??;
                Ok(ExtractedText {
                    text,
                    source: ExtractionSource::WordDocument,
                })
            }
            MediaType::Pdf => self.extract_pdf(document.bytes.clone()).await.into_result(),
        }
    }

    /// Runs the text-layer phase, escalating to OCR only on measured failure.
    pub async fn extract_pdf(&self, bytes: Bytes) -> PdfOutcome {
        let reader = Arc::clone(&self.text_layer);
        let parse_input = bytes.clone();
        let pages = match tokio::task::spawn_blocking(move || reader.read_pages(&parse_input)).await
        {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                warn!("PDF text layer could not be read: {e}");
                return PdfOutcome::Failed(
                    "Failed to extract text from PDF. Please ensure the file is a valid PDF."
                        .to_string(),
                );
            }
            Err(e) => {
                warn!("PDF text layer task panicked: {e}");
                return PdfOutcome::Failed(
                    "Failed to extract text from PDF. Please ensure the file is a valid PDF."
                        .to_string(),
                );
            }
        };

        let text = pdf::join_text_layer(&pages);
        let text_chars = char_len(&text);
        if text_chars >= MIN_TEXT_CHARS {
            info!(
                "PDF text layer extracted {} chars from {} pages",
                text_chars,
                pages.len()
            );
            return PdfOutcome::TextLayer(text);
        }

        info!(
            "PDF text layer yielded {} chars across {} pages, falling back to OCR",
            text_chars,
            pages.len()
        );
        self.ocr_pages(&bytes, pages.len()).await
    }

    async fn ocr_pages(&self, bytes: &[u8], page_count: usize) -> PdfOutcome {
        let mut full_text = String::new();

        // Sequential on purpose: output order must follow page order.
        for page_number in 1..=page_count as u32 {
            info!("Processing page {page_number} of {page_count} with OCR...");
            let image = match self
                .rasterizer
                .rasterize(bytes, page_number, OCR_RENDER_SCALE)
                .await
            {
                Ok(image) => image,
                Err(e) => {
                    warn!("Rasterizing page {page_number} failed: {e}");
                    return ocr_failure();
                }
            };
            let recognized = match self.ocr.recognize(&image).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("OCR on page {page_number} failed: {e}");
                    return ocr_failure();
                }
            };
            full_text.push_str(&recognized);
            full_text.push_str("\n\n");
        }

        let cleaned = full_text.trim();
        if char_len(cleaned) < MIN_TEXT_CHARS {
            return PdfOutcome::Failed(
                "Could not extract meaningful text from the PDF using OCR. \
                 The image quality might be too low."
                    .to_string(),
            );
        }

        info!("OCR extraction completed: {} chars", char_len(cleaned));
        PdfOutcome::Ocr {
            text: cleaned.to_string(),
            pages: page_count,
        }
    }
}

fn ocr_failure() -> PdfOutcome {
    PdfOutcome::Failed(
        "Failed to extract text from scanned PDF. \
         Please ensure the image quality is clear and readable."
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ocr::RasterPage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedPages(Vec<String>);

    impl TextLayerReader for FixedPages {
        fn read_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenPdf;

    impl TextLayerReader for BrokenPdf {
        fn read_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Err(ExtractionError::ExtractionFailed("bad xref".to_string()))
        }
    }

    /// Records every page number it is asked to render.
    #[derive(Default)]
    struct RecordingRasterizer {
        calls: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PageRasterizer for RecordingRasterizer {
        async fn rasterize(
            &self,
            _pdf: &[u8],
            page_number: u32,
            scale: f32,
        ) -> Result<RasterPage, ExtractionError> {
            assert!((scale - OCR_RENDER_SCALE).abs() < f32::EPSILON);
            self.calls.lock().unwrap().push(page_number);
            Ok(RasterPage {
                page_number,
                png: vec![page_number as u8],
            })
        }
    }

    /// Returns a canned transcript per page and counts invocations.
    struct ScriptedOcr {
        per_page: Vec<String>,
        calls: Mutex<Vec<u32>>,
    }

    impl ScriptedOcr {
        fn new(per_page: &[&str]) -> Self {
            Self {
                per_page: per_page.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OcrEngine for ScriptedOcr {
        async fn recognize(&self, image: &RasterPage) -> Result<String, ExtractionError> {
            self.calls.lock().unwrap().push(image.page_number);
            Ok(self
                .per_page
                .get(image.page_number as usize - 1)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn build(
        reader: impl TextLayerReader + 'static,
        ocr: Arc<ScriptedOcr>,
    ) -> (Extractor, Arc<RecordingRasterizer>) {
        let rasterizer = Arc::new(RecordingRasterizer::default());
        let extractor = Extractor::new(Arc::new(reader), rasterizer.clone(), ocr);
        (extractor, rasterizer)
    }

    fn pdf_doc() -> Document {
        Document::new(MediaType::Pdf, b"%PDF-1.7 fake".to_vec())
    }

    const LEGIBLE_SCAN: &str =
        "Jane Doe\nStaff Engineer at Acme Corp\nBuilt distributed billing systems in Rust and Go";

    #[test]
    fn test_media_type_from_mime_allow_list() {
        assert_eq!(MediaType::from_mime("application/pdf").unwrap(), MediaType::Pdf);
        assert_eq!(MediaType::from_mime(MIME_DOCX).unwrap(), MediaType::Docx);
        assert_eq!(
            MediaType::from_mime("application/msword").unwrap(),
            MediaType::LegacyWord
        );
        assert_eq!(
            MediaType::from_mime("Text/Plain; charset=utf-8").unwrap(),
            MediaType::PlainText
        );
    }

    #[test]
    fn test_media_type_rejects_unknown() {
        let err = MediaType::from_mime("image/png").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(ref m) if m == "image/png"));
    }

    #[tokio::test]
    async fn test_plain_text_is_identity() {
        let ocr = Arc::new(ScriptedOcr::new(&[]));
        let (extractor, _) = build(FixedPages(vec![]), ocr);
        for input in ["", "hi", "  padded with spaces  \n", "Ünïcödé résumé ✓"] {
            let doc = Document::new(MediaType::PlainText, input.as_bytes().to_vec());
            let out = extractor.extract(&doc).await.unwrap();
            assert_eq!(out.text, input);
            assert_eq!(out.source, ExtractionSource::Passthrough);
        }
    }

    #[tokio::test]
    async fn test_text_layer_success_never_invokes_ocr() {
        let ocr = Arc::new(ScriptedOcr::new(&[LEGIBLE_SCAN]));
        let (extractor, rasterizer) = build(
            FixedPages(vec![
                "Senior Engineer with 5 years Python experience".to_string(),
                "Led   a team\nof four".to_string(),
            ]),
            ocr.clone(),
        );

        let out = extractor.extract(&pdf_doc()).await.unwrap();
        assert_eq!(
            out.text,
            "Senior Engineer with 5 years Python experience\n\nLed a team of four"
        );
        assert_eq!(out.source, ExtractionSource::TextLayer);
        assert_eq!(ocr.call_count(), 0);
        assert!(rasterizer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_born_digital_with_blank_image_pages_skips_ocr() {
        let ocr = Arc::new(ScriptedOcr::new(&[]));
        let page_one = "Senior Engineer with 5 years Python experience building data pipelines";
        let (extractor, _) = build(
            FixedPages(vec![page_one.to_string(), String::new(), "   ".to_string()]),
            ocr.clone(),
        );

        let out = extractor.extract(&pdf_doc()).await.unwrap();
        assert_eq!(out.text, page_one);
        assert_eq!(ocr.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_text_layer_runs_ocr_once_per_page_in_order() {
        let ocr = Arc::new(ScriptedOcr::new(&[
            "Page one: Jane Doe, Staff Engineer",
            "Page two: Rust, Go, Kubernetes, PostgreSQL",
            "Page three: BSc Computer Science",
        ]));
        let (extractor, rasterizer) = build(
            FixedPages(vec!["x".to_string(), String::new(), String::new()]),
            ocr.clone(),
        );

        let out = extractor.extract(&pdf_doc()).await.unwrap();
        assert_eq!(out.source, ExtractionSource::Ocr);
        assert_eq!(
            out.text,
            "Page one: Jane Doe, Staff Engineer\n\n\
             Page two: Rust, Go, Kubernetes, PostgreSQL\n\n\
             Page three: BSc Computer Science"
        );
        assert_eq!(*ocr.calls.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*rasterizer.calls.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_scanned_single_page_pdf_single_ocr_pass() {
        let ocr = Arc::new(ScriptedOcr::new(&[LEGIBLE_SCAN]));
        let (extractor, _) = build(FixedPages(vec![String::new()]), ocr.clone());

        let outcome = extractor.extract_pdf(Bytes::from_static(b"%PDF")).await;
        assert_eq!(
            outcome,
            PdfOutcome::Ocr {
                text: LEGIBLE_SCAN.to_string(),
                pages: 1
            }
        );
        assert_eq!(ocr.call_count(), 1);
    }

    #[tokio::test]
    async fn test_all_black_page_fails_after_ocr() {
        let ocr = Arc::new(ScriptedOcr::new(&["  \n"]));
        let (extractor, _) = build(FixedPages(vec![String::new()]), ocr.clone());

        let err = extractor.extract(&pdf_doc()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(ref m) if m.contains("image quality")));
        assert_eq!(ocr.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_fails_without_ocr() {
        let ocr = Arc::new(ScriptedOcr::new(&[LEGIBLE_SCAN]));
        let (extractor, _) = build(BrokenPdf, ocr.clone());

        let err = extractor.extract(&pdf_doc()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
        assert_eq!(ocr.call_count(), 0);
    }

    #[tokio::test]
    async fn test_legacy_word_binary_fails_extraction() {
        let ocr = Arc::new(ScriptedOcr::new(&[]));
        let (extractor, _) = build(FixedPages(vec![]), ocr);
        let ole_header = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0];
        let doc = Document::new(MediaType::LegacyWord, ole_header);

        let err = extractor.extract(&doc).await.unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }
}
