use crate::renderers::RenderedPage;
use std::collections::HashSet;

/// Collects candidate job links from a rendered landing page
///
/// A candidate is any anchor whose href starts with a fixed scheme+host
/// prefix such as `https://hvr`. This is a plain string prefix, not a
/// pattern.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    prefix: String,
}

impl LinkFilter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a single href is a candidate
    pub fn accepts(&self, href: &str) -> bool {
        !href.is_empty() && href.starts_with(&self.prefix)
    }

    /// Distinct matching hrefs of `page`, in order of first appearance
    pub fn collect(&self, page: &RenderedPage) -> Vec<String> {
        let links = dedup(page.query_links(&self.prefix));
        ::log::debug!(
            "Collected {} candidate links from {} anchors on {}",
            links.len(),
            page.links.len(),
            page.url
        );
        links
    }
}

/// Drop repeated entries, keeping the first occurrence of each
pub fn dedup<'a>(hrefs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    hrefs
        .into_iter()
        .filter(|href| seen.insert(*href))
        .map(str::to_string)
        .collect()
}
