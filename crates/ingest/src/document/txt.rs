use super::PageText;

pub(super) fn extract_txt(bytes: &[u8]) -> Vec<PageText> {
    // UTF-8 with lossy fallback; uploads from browsers are occasionally latin-1.
    let text = String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());

    vec![PageText {
        number: 1,
        text: text.trim().to_string(),
        headings: Vec::new(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_trimmed() {
        let pages = extract_txt(b"  \n A few words. \n ");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].text, "A few words.");
    }

    #[test]
    fn invalid_utf8_is_lossy_not_fatal() {
        let pages = extract_txt(&[b'o', b'k', 0xFF, b'!']);
        assert!(pages[0].text.starts_with("ok"));
    }
}
