mod md;
mod pdf;
mod txt;

use explainer_core::config::ExtractConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("document contains no extractable text")]
    NoText,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of source the text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Markdown,
    Html,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
            DocumentKind::Markdown => "markdown",
            DocumentKind::Html => "html",
        }
    }
}

/// One page of extracted text.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number; always 1 for sources without pages.
    pub number: usize,
    pub text: String,
    /// Headings found on the page (Markdown sources only).
    pub headings: Vec<String>,
}

/// A document reduced to plain text, ready for the explain pipeline.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Where the text came from: a filename or a URL.
    pub origin: String,
    pub kind: DocumentKind,
    pub pages: Vec<PageText>,
}

impl SourceDocument {
    /// All page text joined into the single string the LLM sees.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Extract text from uploaded file bytes, dispatching on the file extension.
pub fn extract_text(
    bytes: &[u8],
    filename: &str,
    config: &ExtractConfig,
) -> Result<SourceDocument, ExtractError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    let (kind, pages) = match ext.as_str() {
        "pdf" => (DocumentKind::Pdf, pdf::extract_pdf(bytes, config)?),
        "txt" | "text" => (DocumentKind::Text, txt::extract_txt(bytes)),
        "md" | "markdown" => (DocumentKind::Markdown, md::extract_md(bytes)),
        other => return Err(ExtractError::UnsupportedType(other.to_string())),
    };

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(ExtractError::NoText);
    }

    Ok(SourceDocument {
        origin: filename.to_string(),
        kind,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractConfig {
        ExtractConfig {
            ocr_command: None,
            max_upload_mb: 25,
        }
    }

    #[test]
    fn dispatches_on_extension() {
        let doc = extract_text(b"plain words", "notes.txt", &config()).unwrap();
        assert_eq!(doc.kind, DocumentKind::Text);
        assert_eq!(doc.origin, "notes.txt");

        let doc = extract_text(b"# Title\n\nBody.", "notes.md", &config()).unwrap();
        assert_eq!(doc.kind, DocumentKind::Markdown);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = extract_text(b"...", "slides.pptx", &config()).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(ext) if ext == "pptx"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = extract_text(b"   \n  ", "blank.txt", &config()).unwrap_err();
        assert!(matches!(err, ExtractError::NoText));
    }

    #[test]
    fn full_text_joins_pages() {
        let doc = SourceDocument {
            origin: "a.pdf".to_string(),
            kind: DocumentKind::Pdf,
            pages: vec![
                PageText {
                    number: 1,
                    text: "first".to_string(),
                    headings: vec![],
                },
                PageText {
                    number: 2,
                    text: "second".to_string(),
                    headings: vec![],
                },
            ],
        };
        assert_eq!(doc.full_text(), "first\n\nsecond");
        assert_eq!(doc.total_chars(), 11);
    }
}
