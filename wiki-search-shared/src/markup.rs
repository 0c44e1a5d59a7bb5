//! Markup stripping for indexed content.
//!
//! Wiki content is stored as HTML. Only the visible text is indexed: tags are removed,
//! block-level elements become word boundaries, and whitespace is collapsed.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HIDDEN_BLOCK_REGEXP: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
            .unwrap();
    static ref BLOCK_TAG_REGEXP: Regex = Regex::new(
        r"(?i)</?(p|div|br|hr|li|ul|ol|dl|dt|dd|h[1-6]|table|thead|tbody|tr|td|th|blockquote|pre|section|article|header|footer|nav|aside|figure|figcaption)\b[^>]*>"
    )
    .unwrap();
    static ref TAG_REGEXP: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_REGEXP: Regex = Regex::new(r"\s+").unwrap();
}

/// Entities decoded after tag removal. `&amp;` comes last so that an escaped
/// entity such as `&amp;lt;` decodes to the literal text `&lt;`.
const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Strip HTML markup, keeping the visible text.
///
/// # Example
///
/// ```
/// use wiki_search_shared::strip_html_tags;
///
/// assert_eq!(strip_html_tags("<p>Hello <b>World</b></p>"), "Hello World");
/// ```
pub fn strip_html_tags(html: &str) -> String {
    let text = HIDDEN_BLOCK_REGEXP.replace_all(html, " ");
    let text = BLOCK_TAG_REGEXP.replace_all(&text, " ");
    let text = TAG_REGEXP.replace_all(&text, "");

    let mut decoded = text.into_owned();
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }

    WHITESPACE_REGEXP
        .replace_all(&decoded, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_tags_are_removed_without_splitting_words() {
        assert_eq!(strip_html_tags("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_html_tags("un<em>break</em>able"), "unbreakable");
    }

    #[test]
    fn test_block_tags_become_word_boundaries() {
        assert_eq!(strip_html_tags("<p>one</p><p>two</p>"), "one two");
        assert_eq!(strip_html_tags("<li>a</li><li>b</li>"), "a b");
        assert_eq!(strip_html_tags("line<br/>break"), "line break");
        assert_eq!(strip_html_tags("<h1>Title</h1>Body"), "Title Body");
    }

    #[test]
    fn test_scripts_styles_and_comments_are_dropped() {
        let html = "<style>p { color: red }</style><p>shown</p><script>alert(1)</script><!-- hidden -->";
        assert_eq!(strip_html_tags(html), "shown");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(
            strip_html_tags("<p>Fish &amp; Chips&nbsp;&lt;3</p>"),
            "Fish & Chips <3"
        );
        assert_eq!(strip_html_tags("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(strip_html_tags("plain text"), "plain text");
        assert_eq!(strip_html_tags(""), "");
        assert_eq!(strip_html_tags("  spaced \n out  "), "spaced out");
    }
}
