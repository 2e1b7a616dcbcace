//! Locating and parsing the fenced JSON quote block.
//!
//! The explain prompt asks the model to end its response with a Markdown
//! fence tagged `json` containing a single object such as
//! `{ "0": "first quoted passage", "1": "second quoted passage" }` — keys are
//! base-10 integer strings, values are the quoted source passages.

use std::collections::BTreeMap;
use std::ops::Range;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// A located quote block: the byte range of the whole fenced block within the
/// response text, and the raw JSON payload between the fences.
pub(crate) struct QuoteBlock {
    pub span: Range<usize>,
    pub raw: String,
}

/// Find the last complete ```json fenced block in `text`.
///
/// The prompt puts the block at the end of the response, so when the model
/// echoes other json fences in its prose the last one is the quote block.
/// An opening fence with no closing fence is treated as absent.
pub(crate) fn find_block(text: &str) -> Option<QuoteBlock> {
    let open = text.rfind(FENCE_OPEN)?;
    let body_start = open + FENCE_OPEN.len();
    let close_rel = text[body_start..].find(FENCE_CLOSE)?;
    let close = body_start + close_rel;
    let end = close + FENCE_CLOSE.len();

    Some(QuoteBlock {
        span: open..end,
        raw: text[body_start..close].trim().to_string(),
    })
}

/// Parse the block payload into index → quote pairs, sorted by index.
///
/// Rejects anything that is not a JSON object of integer-string keys to
/// string values; the caller downgrades the rejection to a warning.
pub(crate) fn parse_block(raw: &str) -> Result<BTreeMap<usize, String>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;

    let obj = value
        .as_object()
        .ok_or_else(|| "expected a JSON object".to_string())?;

    let mut entries = BTreeMap::new();
    for (key, val) in obj {
        let index: usize = key
            .parse()
            .map_err(|_| format!("key {key:?} is not a base-10 integer"))?;
        let quote = val
            .as_str()
            .ok_or_else(|| format!("value for key {key:?} is not a string"))?;
        entries.insert(index, quote.to_string());
    }

    Ok(entries)
}

/// Remove the block's literal text from `text`, tidying the cut edge.
pub(crate) fn strip_block(text: &str, span: &Range<usize>) -> String {
    let mut out = String::with_capacity(text.len() - span.len());
    out.push_str(&text[..span.start]);
    out.push_str(&text[span.end..]);
    out.trim_end().to_string()
}
