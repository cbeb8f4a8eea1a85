use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::parsers;
use crate::renderers::{RenderedPage, Renderer};
use async_trait::async_trait;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Well-known local driver endpoints tried when the configured one is down
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Renders pages in a real browser through a WebDriver server
///
/// One session is opened per run and reused for every page.
pub struct WebDriverRenderer {
    client: Client,
}

impl WebDriverRenderer {
    /// Open a browser session, trying fallback endpoints if needed
    pub async fn connect(config: &WatchConfig) -> Result<Self> {
        let capabilities = capabilities(config);

        match open_session(&config.webdriver_url, &capabilities).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    config.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == config.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = open_session(url, &capabilities).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(WatchError::load(
            &config.webdriver_url,
            "no WebDriver server reachable",
        ))
    }
}

async fn open_session(
    webdriver_url: &str,
    capabilities: &Map<String, Value>,
) -> std::result::Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());
    builder.connect(webdriver_url).await
}

/// Browser options: headless mode and the page language
fn capabilities(config: &WatchConfig) -> Map<String, Value> {
    let lang = config
        .accept_language
        .split(',')
        .next()
        .unwrap_or("en-US")
        .trim()
        .to_string();

    let mut args = vec![format!("--lang={}", lang), "--disable-gpu".to_string()];
    let mut firefox_args: Vec<&str> = Vec::new();
    if config.headless {
        args.push("--headless=new".to_string());
        firefox_args.push("-headless");
    }

    let mut caps = Map::new();
    // W3C session timeouts: the browser abandons a load that runs too long
    caps.insert(
        "timeouts".to_string(),
        json!({ "pageLoad": config.root_timeout().as_millis() as u64 }),
    );
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "prefs": { "intl.accept_languages": config.accept_language },
        }),
    );
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "intl.accept_languages": config.accept_language },
        }),
    );
    caps
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let started = std::time::Instant::now();

        self.client
            .goto(url)
            .await
            .map_err(|e| navigation_error(e, "accessing", url))?;

        // Rendered text of the body: hidden elements are already excluded
        let text = self
            .client
            .find(Locator::Css("body"))
            .await
            .map_err(|e| navigation_error(e, "finding body of", url))?
            .text()
            .await
            .map_err(|e| navigation_error(e, "reading text of", url))?;

        let source = self
            .client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", url))?;
        let links = parsers::html::parse_links_only(&source);

        ::log::debug!(
            "Rendered {} ({} links) in {:.2} seconds",
            url,
            links.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(RenderedPage::new(url, text, links))
    }

    async fn set_page_load_timeout(&self, limit: Duration) -> Result<()> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(limit), None))
            .await
            .map_err(|e| WatchError::load("webdriver session", e))
    }

    async fn close(&self) -> Result<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| WatchError::load("webdriver session", e))
    }
}

/// Maps a WebDriver command failure to a load error, noting lost sessions
fn navigation_error(error: fantoccini::error::CmdError, context: &str, url: &str) -> WatchError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    }
    WatchError::load(url, format!("{}: {}", context, error))
}
