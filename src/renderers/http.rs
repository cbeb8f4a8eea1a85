use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::parsers;
use crate::renderers::{RenderedPage, Renderer};
use async_trait::async_trait;
use reqwest::{Client, header};

/// Fetches pages over plain HTTP and extracts their visible text
///
/// Suitable for server-rendered pages; nothing runs client-side script.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(config: &WatchConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let language = header::HeaderValue::from_str(&config.accept_language).map_err(|e| {
            WatchError::Config(format!(
                "accept_language '{}': {}",
                config.accept_language, e
            ))
        })?;
        headers.insert(header::ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WatchError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::load(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::load(url, format!("HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| WatchError::load(url, e))?;
        let parsed = parsers::html::parse(&body);

        Ok(RenderedPage::new(url, parsed.content, parsed.links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_render_extracts_text_and_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><h1>Picker</h1><script>var x = 1;</script>
                <a href="https://hvr.example.com/1">Job</a></body></html>"#,
            ))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(&WatchConfig::new(&server.uri())).unwrap();
        let page = renderer
            .render(&format!("{}/jobs", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.text, "Picker Job");
        assert_eq!(page.links, vec!["https://hvr.example.com/1"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_load_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(&WatchConfig::new(&server.uri())).unwrap();
        let result = renderer.render(&format!("{}/missing", server.uri())).await;

        assert!(matches!(result, Err(WatchError::Load { .. })));
    }
}
