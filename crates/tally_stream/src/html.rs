//! Post content to plain text.

use scraper::{Html, Node};

/// Convert a post's HTML content to plain text.
///
/// Line breaks and paragraph boundaries become newlines, all other markup is
/// dropped and character references are decoded. En spaces (U+2002) become
/// ordinary spaces.
///
/// # Examples
///
/// ```
/// use tally_stream::html_to_text;
///
/// assert_eq!(html_to_text("<p>a &amp; b<br>c</p><p>d</p>"), "a & b\nc\nd");
/// ```
pub fn html_to_text(content: &str) -> String {
    let fragment = Html::parse_fragment(content);
    let mut text = String::with_capacity(content.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(element) => match element.name() {
                "br" => text.push('\n'),
                "p" if !text.is_empty() => text.push('\n'),
                _ => {}
            },
            _ => {}
        }
    }

    text.replace('\u{2002}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_mention_markup() {
        let html = r#"<p><span class="h-card"><a href="https://example.social/@tally" class="u-url mention">@<span>tally</span></a></span> hi</p>"#;
        assert_eq!(html_to_text(html), "@tally hi");
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(html_to_text("&#39;x&#x27; &lt;y&gt;"), "'x' <y>");
    }

    #[test]
    fn replaces_en_space() {
        assert_eq!(html_to_text("a\u{2002}b"), "a b");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(html_to_text("tally!"), "tally!");
    }
}
