use std::path::PathBuf;
use std::process::Command;

use explainer_core::config::ExtractConfig;
use serde::Deserialize;

use super::{ExtractError, PageText};

pub(super) fn extract_pdf(
    bytes: &[u8],
    config: &ExtractConfig,
) -> Result<Vec<PageText>, ExtractError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    if text.trim().is_empty() {
        // Extraction succeeded but found nothing: scanned/image-only PDF.
        return match ocr_fallback(bytes, config) {
            Ok(pages) => {
                tracing::info!("OCR fallback recovered {} page(s)", pages.len());
                Ok(pages)
            }
            Err(e) => {
                tracing::warn!("OCR fallback failed: {}", e);
                Err(ExtractError::NoText)
            }
        };
    }

    // pdf-extract returns one string; form feeds separate pages when present.
    let pages: Vec<PageText> = if text.contains('\x0C') {
        text.split('\x0C')
            .enumerate()
            .filter(|(_, page)| !page.trim().is_empty())
            .map(|(i, page)| PageText {
                number: i + 1,
                text: page.trim().to_string(),
                headings: Vec::new(),
            })
            .collect()
    } else {
        vec![PageText {
            number: 1,
            text: text.trim().to_string(),
            headings: Vec::new(),
        }]
    };

    Ok(pages)
}

#[derive(Deserialize)]
struct OcrPage {
    page_number: usize,
    text: String,
}

#[derive(Deserialize)]
struct OcrOutput {
    pages: Vec<OcrPage>,
}

/// Temp file removed on every exit path, including early `?` returns.
struct TempPdf(PathBuf);

impl TempPdf {
    fn write(bytes: &[u8]) -> Result<Self, ExtractError> {
        let path = std::env::temp_dir().join(format!("explain_{}.pdf", uuid::Uuid::new_v4()));
        std::fs::write(&path, bytes)?;
        Ok(Self(path))
    }
}

impl Drop for TempPdf {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Run the configured OCR command against the PDF and parse its JSON output
/// (`{"pages": [{"page_number": n, "text": "..."}]}` on stdout).
fn ocr_fallback(bytes: &[u8], config: &ExtractConfig) -> Result<Vec<PageText>, ExtractError> {
    let command = config
        .ocr_command
        .as_deref()
        .ok_or_else(|| ExtractError::Pdf("no OCR command configured".to_string()))?;

    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| ExtractError::Pdf("empty OCR command".to_string()))?;

    let temp = TempPdf::write(bytes)?;

    let output = Command::new(program)
        .args(parts)
        .arg(&temp.0)
        .output()
        .map_err(|e| ExtractError::Pdf(format!("failed to run OCR command: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Pdf(format!("OCR command failed: {stderr}")));
    }

    parse_ocr_output(&output.stdout)
}

fn parse_ocr_output(stdout: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let parsed: OcrOutput = serde_json::from_slice(stdout)
        .map_err(|e| ExtractError::Pdf(format!("unparseable OCR output: {e}")))?;

    let pages: Vec<PageText> = parsed
        .pages
        .into_iter()
        .filter(|p| !p.text.trim().is_empty())
        .map(|p| PageText {
            number: p.page_number,
            text: p.text,
            headings: Vec::new(),
        })
        .collect();

    if pages.is_empty() {
        return Err(ExtractError::Pdf("OCR found no text".to_string()));
    }

    Ok(pages)
}
