//! Word documents: raw text from the OOXML container's `word/document.xml`.
//!
//! Paragraphs are separated by a blank line; `w:tab` becomes a tab and
//! `w:br`/`w:cr` a newline. Legacy binary `.doc` files are not zip
//! containers and fail to open.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::extraction::{char_len, ExtractionError, MIN_TEXT_CHARS};

const DOCUMENT_PART: &str = "word/document.xml";

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:p(?:\s[^>]*[^/>])?>(.*?)</w:p>|<w:p(?:\s[^>]*)?/>")
            .expect("paragraph regex is valid")
    })
}

fn run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:t(?:\s[^>]*[^/>])?>(.*?)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>")
            .expect("run regex is valid")
    })
}

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_document_part(bytes).map_err(|e| {
        warn!("Word document could not be opened: {e}");
        ExtractionError::ExtractionFailed(
            "Failed to parse DOCX file. Please ensure it is a valid Word document.".to_string(),
        )
    })?;

    let text = document_xml_to_text(&xml);
    debug!("Extracted {} chars from word document", char_len(&text));

    if char_len(&text) < MIN_TEXT_CHARS {
        return Err(ExtractionError::ExtractionFailed(
            "Could not extract meaningful text from DOCX file.".to_string(),
        ));
    }
    Ok(text)
}

fn read_document_part(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Flattens WordprocessingML body XML to plain text, trimmed.
pub fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    for paragraph in paragraph_re().captures_iter(xml) {
        if let Some(body) = paragraph.get(1) {
            for run in run_re().captures_iter(body.as_str()) {
                match run.get(1) {
                    Some(text) => out.push_str(&html_escape::decode_html_entities(text.as_str())),
                    None if run[0].starts_with("<w:tab") => out.push('\t'),
                    None => out.push('\n'),
                }
            }
        }
        out.push_str("\n\n");
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            let options = SimpleFileOptions::default();
            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(b"<Types/>").unwrap();
            zip.start_file(DOCUMENT_PART, options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_paragraphs_joined_by_blank_line() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p><w:p><w:r><w:t>Staff Engineer</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_xml_to_text(&xml), "Jane Doe\n\nStaff Engineer");
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>2019</w:t><w:br/><w:t>&lt;lead&gt;</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_xml_to_text(&xml), "R&D\t2019\n<lead>");
    }

    #[test]
    fn test_empty_paragraphs_do_not_leak_markup() {
        let xml = wrap_body(r#"<w:p/><w:p><w:r><w:t>Skills</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>Rust</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#);
        assert_eq!(document_xml_to_text(&xml), "Skills\n\nRust");
    }

    #[test]
    fn test_extract_docx_text_from_container() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>Jane Doe, Staff Engineer at Acme Corp</w:t></w:r></w:p><w:p><w:r><w:t>Designed event-sourced billing in Rust and Go</w:t></w:r></w:p>"#,
        );
        let text = extract_docx_text(&build_docx(&xml)).unwrap();
        assert!(text.starts_with("Jane Doe"));
        assert!(text.contains("\n\nDesigned event-sourced billing"));
    }

    #[test]
    fn test_short_document_fails() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>"#);
        let err = extract_docx_text(&build_docx(&xml)).unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(ref m) if m.contains("meaningful")));
    }

    #[test]
    fn test_non_zip_fails() {
        let err = extract_docx_text(b"plain bytes, not a zip").unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(ref m) if m.contains("valid Word document")));
    }
}
