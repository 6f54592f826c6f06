//! Hyperlink extraction and fetched-page text reduction.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum characters of fetched page text forwarded to the model.
pub const MAX_CONTENT_LEN: usize = 4000;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("url regex is valid")
    })
}

/// Extracts http/https links embedded in note body text, in order of
/// appearance, without duplicates.
pub fn extract_links(body: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in url_regex().find_iter(body) {
        let url = m.as_str().trim_end_matches(['.', ',', ';']).to_string();
        if !seen.contains(&url) {
            seen.push(url);
        }
    }
    seen
}

/// Returns true for links the fetch step supports.
pub fn is_fetchable(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Reduces fetched HTML to plain-ish text: scripts and styles dropped,
/// tags stripped, common entities decoded, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    static BLOCKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACE: OnceLock<Regex> = OnceLock::new();

    let blocks = BLOCKS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("block regex")
    });
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex"));
    let space = SPACE.get_or_init(|| Regex::new(r"\s+").expect("space regex"));

    let text = blocks.replace_all(html, " ");
    let text = tags.replace_all(&text, " ");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    space.replace_all(&text, " ").trim().to_string()
}

/// Truncates page text to the model-facing budget on a char boundary.
pub fn truncate_content(text: &str) -> String {
    if text.chars().count() <= MAX_CONTENT_LEN {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CONTENT_LEN).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_links_in_order_without_duplicates() {
        let body = "see https://example.com/a and http://other.net/b, \
                    then https://example.com/a again";
        assert_eq!(
            extract_links(body),
            vec!["https://example.com/a", "http://other.net/b"]
        );
    }

    #[test]
    fn trailing_punctuation_is_not_part_of_the_link() {
        let body = "read https://example.com/page.";
        assert_eq!(extract_links(body), vec!["https://example.com/page"]);
    }

    #[test]
    fn no_links_yields_empty() {
        assert!(extract_links("plain text only").is_empty());
    }

    #[test]
    fn non_http_schemes_are_unfetchable() {
        assert!(is_fetchable("https://example.com"));
        assert!(!is_fetchable("ftp://example.com"));
        assert!(!is_fetchable("notes://local"));
    }

    #[test]
    fn html_reduction_strips_tags_and_scripts() {
        let html = "<html><head><style>p{color:red}</style></head>\
                    <body><script>var x=1;</script><p>Hello &amp; welcome</p></body></html>";
        assert_eq!(html_to_text(html), "Hello & welcome");
    }

    #[test]
    fn truncation_respects_budget() {
        let long = "x".repeat(MAX_CONTENT_LEN + 100);
        let cut = truncate_content(&long);
        assert_eq!(cut.chars().count(), MAX_CONTENT_LEN + 3);
        assert!(cut.ends_with("..."));
    }
}
