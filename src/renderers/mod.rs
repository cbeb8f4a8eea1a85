pub mod http;
pub mod webdriver;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use http::HttpRenderer;
pub use webdriver::WebDriverRenderer;

/// A fully loaded page as seen by the user
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// URL the page was requested with
    pub url: String,

    /// Human-visible text of the page body
    pub text: String,

    /// Raw href values of every anchor, in document order
    pub links: Vec<String>,
}

impl RenderedPage {
    pub fn new(url: &str, text: String, links: Vec<String>) -> Self {
        Self {
            url: url.to_string(),
            text,
            links,
        }
    }

    /// Hrefs starting with `prefix`, in document order, duplicates kept
    pub fn query_links<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.links
            .iter()
            .map(String::as_str)
            .filter(move |href| !href.is_empty() && href.starts_with(prefix))
    }
}

/// Capability that loads a URL and returns its rendered content
///
/// Implementations hold whatever session they need for the whole run and
/// release it in [`Renderer::close`]. The caller also bounds every `render`
/// call with its own timer.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Load `url` and return its visible text and anchors
    async fn render(&self, url: &str) -> Result<RenderedPage>;

    /// Limit how long the backend itself waits for a page to load
    async fn set_page_load_timeout(&self, _limit: Duration) -> Result<()> {
        Ok(())
    }

    /// Release the underlying session
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<R: Renderer + ?Sized> Renderer for Box<R> {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        (**self).render(url).await
    }

    async fn set_page_load_timeout(&self, limit: Duration) -> Result<()> {
        (**self).set_page_load_timeout(limit).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}
