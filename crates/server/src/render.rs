//! HTML rendering adapter: turns a reconciled explanation into a page where
//! each `[n]` marker exposes its quote on hover.
//!
//! The core contract this leans on is that reconciler markers are `[` digits
//! `]`. Bracketed numerals already present in the source prose are
//! indistinguishable from markers; they are left alone here only because no
//! citation record points at them.

use minijinja::{context, AutoEscape, Environment};

use explainer_citation::CitationRecord;
use explainer_llm::Explanation;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Document Explainer</title>
<style>
  body { font-family: Georgia, serif; max-width: 46rem; margin: 2rem auto; line-height: 1.6; }
  .explanation { white-space: pre-wrap; }
  sup.citation { color: #1a5fb4; cursor: help; }
  .meta { color: #666; font-size: 0.85rem; margin-bottom: 1.5rem; }
  ol.citations li { margin-bottom: 0.5rem; }
  .orphan { color: #a51d2d; }
</style>
</head>
<body>
<h1>Explanation</h1>
<p class="meta">model: {{ model }}{% if origin %} · source: {{ origin }}{% endif %}</p>
<div class="explanation">{{ body }}</div>
{% if citations %}
<h2>Citations</h2>
<ol class="citations" start="0">
{% for c in citations %}
  <li value="{{ c.index }}"{% if not c.inline %} class="orphan"{% endif %}>
    &ldquo;{{ c.quote }}&rdquo;{% if c.source_ref %} <em>({{ c.source_ref }})</em>{% endif %}
    {%- if not c.inline %} (not cited inline){% endif %}
  </li>
{% endfor %}
</ol>
{% endif %}
{% if warnings %}
<h2>Warnings</h2>
<ul>
{% for w in warnings %}
  <li>{{ w }}</li>
{% endfor %}
</ul>
{% endif %}
</body>
</html>
"#;

#[derive(serde::Serialize)]
struct CitationContext {
    index: usize,
    quote: String,
    source_ref: Option<String>,
    inline: bool,
}

/// Render the full explanation page.
pub fn render_page(
    explanation: &Explanation,
    origin: Option<&str>,
) -> Result<String, minijinja::Error> {
    let result = &explanation.result;
    let body = markup_markers(&result.text, &result.citations);

    let citations: Vec<CitationContext> = result
        .citations
        .iter()
        .map(|c| CitationContext {
            index: c.index,
            quote: c.quote.clone(),
            source_ref: c.source_ref.clone(),
            inline: result.text.contains(&c.marker_text),
        })
        .collect();
    let warnings: Vec<String> = result.warnings.iter().map(|w| w.to_string()).collect();

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.render_str(
        PAGE_TEMPLATE,
        context! {
            // Already escaped and marked up; must not be escaped again.
            body => minijinja::value::Value::from_safe_string(body),
            citations => citations,
            warnings => warnings,
            model => explanation.model,
            origin => origin,
        },
    )
}

/// Escape the text, then wrap each inline marker in a hover element.
///
/// Single left-to-right pass over the escaped text: a bracketed numeral is
/// wrapped only when a citation record carries that index, every occurrence
/// is wrapped, and inserted quote attributes are never rescanned for markers.
fn markup_markers(text: &str, citations: &[CitationRecord]) -> String {
    // Markers contain no HTML metacharacters, so they survive escaping.
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped.as_str();

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        match marker_quote(rest, citations) {
            Some((marker_len, quote)) => {
                out.push_str(&format!(
                    r#"<sup class="citation" title="{}">{}</sup>"#,
                    escape_html(quote),
                    &rest[..marker_len]
                ));
                rest = &rest[marker_len..];
            }
            None => {
                out.push('[');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse a `[digits]` marker at the start of `text` and look up its record.
///
/// Returns the marker's byte length and the quote to show, or `None` when
/// the bracket is not a marker or no record carries the index.
fn marker_quote<'c>(text: &str, citations: &'c [CitationRecord]) -> Option<(usize, &'c str)> {
    let close = text.find(']')?;
    let digits = &text[1..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: usize = digits.parse().ok()?;
    let record = citations.iter().find(|c| c.index == index)?;
    Some((close + 1, &record.quote))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
