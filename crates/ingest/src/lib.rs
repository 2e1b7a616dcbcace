//! Document text acquisition: file extraction (PDF/TXT/MD, with OCR fallback
//! for scanned PDFs) and URL fetching with HTML stripping.

pub mod document;
pub mod fetch;

pub use document::{extract_text, DocumentKind, ExtractError, PageText, SourceDocument};
pub use fetch::{FetchError, Fetcher};
