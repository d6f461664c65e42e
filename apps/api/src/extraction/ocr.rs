//! OCR fallback: rasterize PDF pages with poppler's `pdftoppm`, recognize with `tesseract`.
//!
//! Both tools run as subprocesses against scratch files in a per-call temp dir.

use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::extraction::ExtractionError;

/// PDF user-space resolution; a scale of 1.0 renders at 72 DPI.
const BASE_DPI: f32 = 72.0;

/// A rasterized PDF page, PNG-encoded.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// 1-indexed page number.
    pub page_number: u32,
    pub png: Vec<u8>,
}

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn rasterize(
        &self,
        pdf: &[u8],
        page_number: u32,
        scale: f32,
    ) -> Result<RasterPage, ExtractionError>;
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &RasterPage) -> Result<String, ExtractionError>;
}

pub fn dpi_for_scale(scale: f32) -> u32 {
    (BASE_DPI * scale).round() as u32
}

fn scratch_dir() -> Result<TempDir, ExtractionError> {
    tempfile::tempdir()
        .map_err(|e| ExtractionError::ExtractionFailed(format!("Failed to create temp dir: {e}")))
}

async fn write_scratch(
    dir: &TempDir,
    name: &str,
    bytes: &[u8],
) -> Result<PathBuf, ExtractionError> {
    let path = dir.path().join(name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ExtractionError::ExtractionFailed(format!("Failed to write {name}: {e}")))?;
    Ok(path)
}

pub struct PopplerRasterizer {
    bin: String,
}

impl PopplerRasterizer {
    pub fn new(bin: &str) -> Self {
        Self {
            bin: bin.to_string(),
        }
    }
}

#[async_trait]
impl PageRasterizer for PopplerRasterizer {
    async fn rasterize(
        &self,
        pdf: &[u8],
        page_number: u32,
        scale: f32,
    ) -> Result<RasterPage, ExtractionError> {
        let dir = scratch_dir()?;
        let input = write_scratch(&dir, "input.pdf", pdf).await?;
        let output_prefix = dir.path().join("page");
        let page = page_number.to_string();

        let output = Command::new(&self.bin)
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(dpi_for_scale(scale).to_string())
            .arg("-f")
            .arg(&page)
            .arg("-l")
            .arg(&page)
            .arg(&input)
            .arg(&output_prefix)
            .output()
            .await
            .map_err(|e| {
                ExtractionError::ExtractionFailed(format!("Failed to run {}: {e}", self.bin))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::ExtractionFailed(format!(
                "pdftoppm failed on page {page_number}: {}",
                stderr.trim()
            )));
        }

        // -singlefile writes exactly `<prefix>.png`
        let png = tokio::fs::read(output_prefix.with_extension("png"))
            .await
            .map_err(|e| {
                ExtractionError::ExtractionFailed(format!(
                    "pdftoppm produced no image for page {page_number}: {e}"
                ))
            })?;

        debug!("Rasterized page {page_number} ({} bytes)", png.len());
        Ok(RasterPage { page_number, png })
    }
}

pub struct TesseractEngine {
    bin: String,
    language: String,
}

impl TesseractEngine {
    pub fn new(bin: &str, language: &str) -> Self {
        Self {
            bin: bin.to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &RasterPage) -> Result<String, ExtractionError> {
        let dir = scratch_dir()?;
        let input = write_scratch(&dir, "page.png", &image.png).await?;

        let output = Command::new(&self.bin)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| {
                ExtractionError::ExtractionFailed(format!("Failed to run {}: {e}", self.bin))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "tesseract exited with {} on page {}: {}",
                output.status,
                image.page_number,
                stderr.trim()
            );
            return Err(ExtractionError::ExtractionFailed(format!(
                "OCR failed on page {}",
                image.page_number
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
