//! URL input: fetch a page and reduce it to plain text.

use std::time::Duration;

use explainer_core::config::FetchConfig;
use thiserror::Error;
use tracing::debug;

use crate::document::{DocumentKind, PageText, SourceDocument};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("only http(s) URLs are supported, got {0}")]
    UnsupportedScheme(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("response larger than the {0} byte limit")]
    TooLarge(usize),
    #[error("fetched page contains no text")]
    NoText,
}

/// Fetches URL input for the explain pipeline.
pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    /// Fetch `raw_url` and return its content as a [`SourceDocument`].
    ///
    /// HTML responses are stripped to visible text; other textual content is
    /// taken as-is.
    pub async fn fetch(&self, raw_url: &str) -> Result<SourceDocument, FetchError> {
        let parsed =
            url::Url::parse(raw_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(FetchError::UnsupportedScheme(other.to_string())),
        }

        let mut response = self.client.get(parsed).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(true);

        // Reject on the declared length before reading any of the body.
        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
        }

        // Chunked responses declare no length; enforce the cap while reading.
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        let raw = String::from_utf8_lossy(&body);
        let text = if is_html { strip_html(&raw) } else { raw.trim().to_string() };
        debug!("fetched {} ({} chars of text)", raw_url, text.chars().count());

        if text.is_empty() {
            return Err(FetchError::NoText);
        }

        Ok(SourceDocument {
            origin: raw_url.to_string(),
            kind: if is_html { DocumentKind::Html } else { DocumentKind::Text },
            pages: vec![PageText {
                number: 1,
                text,
                headings: Vec::new(),
            }],
        })
    }
}

/// Reduce an HTML page to its visible text.
///
/// Single pass: drops tags, skips script/style/head subtrees, decodes the
/// common entities, and collapses whitespace runs. Good enough for prose
/// pages; not a real HTML parser.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut rest = html;
    let mut skip_until: Option<&str> = None;

    while let Some(open) = rest.find('<') {
        if skip_until.is_none() {
            push_text(&mut out, &rest[..open]);
        }
        rest = &rest[open..];

        let Some(close) = rest.find('>') else { break };
        let tag = &rest[1..close];
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match skip_until {
            Some(until) if tag.starts_with('/') && name == until => skip_until = None,
            None if matches!(name.as_str(), "script" | "style" | "head") && !tag.starts_with('/') => {
                skip_until = Some(match name.as_str() {
                    "script" => "script",
                    "style" => "style",
                    _ => "head",
                });
            }
            // Block-level boundaries become line breaks so paragraphs survive.
            None if matches!(name.as_str(), "p" | "br" | "div" | "li" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }

        rest = &rest[close + 1..];
    }
    if skip_until.is_none() {
        push_text(&mut out, rest);
    }

    // Collapse runs of blank lines left behind by dropped markup.
    let mut collapsed = String::with_capacity(out.len());
    let mut blank_run = 0;
    for line in out.lines() {
        let line = line.trim();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        collapsed.push_str(line);
        collapsed.push('\n');
    }
    collapsed.trim().to_string()
}

fn push_text(out: &mut String, text: &str) {
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    out.push_str(&decoded);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_keeps_text() {
        let html = "<html><body><p>Hello <b>world</b>.</p></body></html>";
        assert_eq!(strip_html(html), "Hello world.");
    }

    #[test]
    fn drops_script_and_style_content() {
        let html = "<head><title>t</title></head><body><script>var x = 1;</script>\
                    <style>p { color: red }</style><p>Visible.</p></body>";
        assert_eq!(strip_html(html), "Visible.");
    }

    #[test]
    fn block_tags_become_line_breaks() {
        let html = "<p>First.</p><p>Second.</p>";
        assert_eq!(strip_html(html), "First.\nSecond.");
    }

    #[test]
    fn decodes_common_entities() {
        let html = "<p>Fish &amp; chips &lt;today&gt;</p>";
        assert_eq!(strip_html(html), "Fish & chips <today>");
    }

    #[test]
    fn collapses_blank_line_runs() {
        let html = "<div></div><div></div><div>one</div><div></div><div></div><div>two</div>";
        let text = strip_html(html);
        assert!(!text.contains("\n\n\n"));
        assert!(text.contains("one"));
        assert!(text.contains("two"));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("no markup at all"), "no markup at all");
    }

    async fn serve_once(head: String, body: String) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body.as_bytes()).await.unwrap();
        });
        addr
    }

    fn small_cap_fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig {
            max_bytes: 1024,
            timeout_secs: 5,
            user_agent: "explainer-test".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn oversized_response_is_rejected_from_its_declared_length() {
        let body = "x".repeat(4096);
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: {}\r\n\r\n",
            body.len()
        );
        let addr = serve_once(head, body).await;

        let err = small_cap_fetcher()
            .fetch(&format!("http://{addr}/big"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge(1024)));
    }

    #[tokio::test]
    async fn oversized_chunked_response_is_rejected_mid_read() {
        let body = "x".repeat(4096);
        let chunked = format!("{:x}\r\n{}\r\n0\r\n\r\n", body.len(), body);
        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\n\
                    transfer-encoding: chunked\r\n\r\n"
            .to_string();
        let addr = serve_once(head, chunked).await;

        let err = small_cap_fetcher()
            .fetch(&format!("http://{addr}/big"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge(1024)));
    }
}
