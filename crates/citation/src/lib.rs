//! Citation reconciliation.
//!
//! Takes raw LLM output text together with the citation annotations the
//! provider reported (character spans) and/or a fenced JSON quote block the
//! model was asked to emit, and produces the text with stable `[n]` markers
//! plus an ordered list of citation records mapping each marker to its quote.
//!
//! Reconciliation is pure: no I/O, no shared state. Anything that goes wrong
//! is recorded as a warning on the result, never returned as an error.

mod block;
mod reconcile;
mod types;

pub use reconcile::reconcile;
pub use types::{Annotation, CitationRecord, ReconcileWarning, ReconciledResult};
