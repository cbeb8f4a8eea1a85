use crate::parsers::{ParseResult, normalize_whitespace};
use scraper::{ElementRef, Html};

/// Elements whose text never reaches the screen
const HIDDEN_TAGS: [&str; 5] = ["head", "script", "style", "noscript", "template"];

/// Elements that flow inline, so their text joins the surrounding words
const INLINE_TAGS: [&str; 24] = [
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "u",
];

/// Parses HTML content to extract visible body text and links
pub fn parse(html: &str) -> ParseResult {
    let doc = Html::parse_document(html);
    let text = visible_text(&doc);
    let links = links(&doc);

    ::log::debug!("HTML parser found {} links", links.len());
    if !links.is_empty() {
        ::log::trace!(
            "First few links: {:?}",
            links.iter().take(5).collect::<Vec<_>>()
        );
    }

    ParseResult::new(text, links)
}

/// Parses HTML content and only extracts links (no text)
pub fn parse_links_only(html: &str) -> Vec<String> {
    links(&Html::parse_document(html))
}

/// Text a reader would see in the body, with script and style content dropped
///
/// Block-level boundaries become spaces so adjacent cells and paragraphs do
/// not run together; inline elements join their neighbours directly.
pub fn visible_text(doc: &Html) -> String {
    let root = doc.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .unwrap_or(root);

    let mut out = String::new();
    push_visible_text(body, &mut out);
    normalize_whitespace(&out)
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }

        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if HIDDEN_TAGS.contains(&name) {
            continue;
        }

        let block = !INLINE_TAGS.contains(&name);
        if block {
            out.push(' ');
        }
        push_visible_text(child, out);
        if block {
            out.push(' ');
        }
    }
}

/// Href of every anchor in document order, as written in the markup
pub fn links(doc: &Html) -> Vec<String> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "a")
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.to_string())
        .collect()
}
