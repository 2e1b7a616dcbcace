//! Input and output types for reconciliation.

use serde::{Deserialize, Serialize};

// ── Input ───────────────────────────────────────────────────────────

/// A citation span reported by the upstream LLM service.
///
/// `start..end` is a half-open span of character offsets (Unicode scalars,
/// not bytes) into the original response text, covering `marker_text` as it
/// appeared there. Annotations arrive untrusted and unordered: spans may be
/// out of range or inconsistent with the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub start: usize,
    pub end: usize,
    /// The literal marker substring the provider placed at the span.
    pub marker_text: String,
    /// Source-document handle, when the provider reports one.
    pub source_ref: Option<String>,
}

// ── Output ──────────────────────────────────────────────────────────

/// One reconciled citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Zero-based index assigned in processing order. Unique per result.
    pub index: usize,
    /// The stable marker for this citation, `"[index]"`.
    pub marker_text: String,
    /// The quoted source passage backing the citation.
    pub quote: String,
    pub source_ref: Option<String>,
}

/// Result of reconciling one LLM response.
///
/// Every marker the reconciler placed in `text` has the form `[i]` and a
/// matching record with `index == i`; no two records share an index. Records
/// merged in from the quote block without a matching inline marker (orphans)
/// appear in `citations` but not in `text`.
///
/// Caveat: `[n]` is not escaped against bracketed numerals already present in
/// the prose (e.g. an existing footnote style). Downstream rendering cannot
/// tell those apart from placed markers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledResult {
    pub text: String,
    pub citations: Vec<CitationRecord>,
    pub warnings: Vec<ReconcileWarning>,
}

/// Non-fatal conditions observed during reconciliation.
///
/// These ride along on [`ReconciledResult`] rather than aborting it; callers
/// decide whether to log or surface them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileWarning {
    #[error("annotation {index}: span {start}..{end} is outside the response text")]
    SpanOutOfRange {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("annotation {index}: marker {marker:?} not found in the response text")]
    MarkerNotFound { index: usize, marker: String },

    #[error("quote block present but unparseable: {0}")]
    MalformedBlock(String),

    #[error("citation {index} has a quote but no inline marker")]
    OrphanCitation { index: usize },
}
