pub mod html;


/// Result of parsing a page
pub struct ParseResult {
    /// Visible text content, whitespace-normalized
    pub content: String,
    /// Raw href values in document order
    pub links: Vec<String>,
}

impl ParseResult {
    /// Creates a new parse result with the given content and links
    pub fn new(content: String, links: Vec<String>) -> Self {
        Self { content, links }
    }
}

/// Collapse every whitespace run, including non-breaking spaces, to one space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
