use super::PageText;

pub(super) fn extract_md(bytes: &[u8]) -> Vec<PageText> {
    let text = String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());

    let headings: Vec<String> = text
        .lines()
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .collect();

    vec![PageText {
        number: 1,
        text: text.trim().to_string(),
        headings,
    }]
}
