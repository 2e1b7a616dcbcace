//! The two-phase reconciliation algorithm.
//!
//! Phase one reads every quote out of the *untouched* original text using the
//! annotation's character span. Phase two substitutes markers by literal
//! marker-text matching. Offsets are never used against mutated text: each
//! substitution changes the text length, and shifting every later span to
//! compensate is an easy place to compound off-by-length drift.

use crate::block;
use crate::types::{Annotation, CitationRecord, ReconcileWarning, ReconciledResult};

/// Reconcile one LLM response.
///
/// `annotations` is taken in the order the provider reported it; each one is
/// assigned the next output index. A fenced JSON quote block embedded in
/// `text`, if present and well-formed, overrides annotation-derived quotes
/// and is stripped from the output; if malformed it is left in place.
///
/// Never fails: problems are recorded on [`ReconciledResult::warnings`].
pub fn reconcile(text: &str, annotations: &[Annotation]) -> ReconciledResult {
    let mut warnings = Vec::new();

    // Phase 1: extract quotes from the original text, before any mutation.
    let mut citations = extract_quotes(text, annotations, &mut warnings);

    // Phase 2: substitute markers by literal text, front to back.
    let mut out = text.to_string();
    for (citation, annotation) in citations.iter().zip(annotations) {
        match find_marker(&out, &annotation.marker_text) {
            Some(range) => out.replace_range(range, &citation.marker_text),
            None => warnings.push(ReconcileWarning::MarkerNotFound {
                index: citation.index,
                marker: annotation.marker_text.clone(),
            }),
        }
    }

    // Phase 3: merge the quote block, if any.
    if let Some(found) = block::find_block(&out) {
        match block::parse_block(&found.raw) {
            Ok(entries) => {
                out = block::strip_block(&out, &found.span);
                merge_block(&mut citations, entries, &out, &mut warnings);
            }
            Err(reason) => {
                // Keep the raw block text in the output rather than guessing.
                warnings.push(ReconcileWarning::MalformedBlock(reason));
            }
        }
    }

    ReconciledResult {
        text: out,
        citations,
        warnings,
    }
}

/// Build one record per annotation, quoting `text[start..end)` (char offsets).
///
/// An invalid span still yields a record (the quote block may supply the
/// quote later); it just starts out empty, with a warning.
fn extract_quotes(
    text: &str,
    annotations: &[Annotation],
    warnings: &mut Vec<ReconcileWarning>,
) -> Vec<CitationRecord> {
    // Char offset -> byte offset, with a sentinel for the end of the text.
    let byte_of: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();

    annotations
        .iter()
        .enumerate()
        .map(|(index, a)| {
            let quote = if a.start <= a.end && a.end < byte_of.len() {
                text[byte_of[a.start]..byte_of[a.end]].to_string()
            } else {
                warnings.push(ReconcileWarning::SpanOutOfRange {
                    index,
                    start: a.start,
                    end: a.end,
                });
                String::new()
            };
            CitationRecord {
                index,
                marker_text: format!("[{index}]"),
                quote,
                source_ref: a.source_ref.clone(),
            }
        })
        .collect()
}

/// Locate `marker` in `text`, returning its byte range.
fn find_marker(text: &str, marker: &str) -> Option<std::ops::Range<usize>> {
    if marker.is_empty() {
        return None;
    }
    let start = text.find(marker)?;
    Some(start..start + marker.len())
}

/// Fold quote-block entries into the record list.
///
/// The block is authoritative: the model produced it deliberately, so a
/// matching index overwrites the span-derived quote. An index with no
/// existing record is appended; if its marker is nowhere in the text it is an
/// orphan — kept for separate rendering, flagged with a warning.
fn merge_block(
    citations: &mut Vec<CitationRecord>,
    entries: std::collections::BTreeMap<usize, String>,
    text: &str,
    warnings: &mut Vec<ReconcileWarning>,
) {
    for (index, quote) in entries {
        match citations.iter_mut().find(|c| c.index == index) {
            Some(existing) => existing.quote = quote,
            None => {
                let marker_text = format!("[{index}]");
                if !text.contains(&marker_text) {
                    warnings.push(ReconcileWarning::OrphanCitation { index });
                }
                citations.push(CitationRecord {
                    index,
                    marker_text,
                    quote,
                    source_ref: None,
                });
            }
        }
    }
}
