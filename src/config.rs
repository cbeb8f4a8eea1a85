use crate::error::{Result, WatchError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration for a single watch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Landing page the job links are collected from
    pub start_url: String,

    /// Locale every job page is rendered in
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Query parameter that selects the page locale
    #[serde(default = "default_locale_key")]
    pub locale_key: String,

    /// Only anchors whose href starts with this prefix are visited
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,

    /// Content rules applied to each job page
    #[serde(default)]
    pub rules: RuleConfig,

    /// Time limit for loading a single job page
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Time limit for loading the landing page
    #[serde(default = "default_root_timeout_secs")]
    pub root_timeout_secs: u64,

    /// Which renderer backend loads the pages
    #[serde(default)]
    pub renderer: RendererKind,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Accept-Language sent with every page request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Telegram delivery; matches are printed to stdout when absent
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

/// Keyword and amount configuration the match rule is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Phrase patterns that match on their own
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,

    /// Generic keyword that must be paired with an amount
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Canonical amounts, digits only
    #[serde(default = "default_amounts")]
    pub amounts: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            phrases: default_phrases(),
            keyword: default_keyword(),
            amounts: default_amounts(),
        }
    }
}

/// Renderer backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Full browser through a WebDriver server
    #[default]
    WebDriver,
    /// Plain HTTP fetch, for server-rendered pages
    Http,
}

/// Telegram bot credentials and delivery options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,

    pub chat_id: String,

    /// Send the message with HTML formatting
    #[serde(default = "default_true")]
    pub html: bool,

    #[serde(default = "default_telegram_api")]
    pub api_base: String,

    #[serde(default = "default_telegram_timeout_secs")]
    pub timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            html: true,
            api_base: default_telegram_api(),
            timeout_secs: default_telegram_timeout_secs(),
        }
    }
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_locale_key() -> String {
    "setlang".to_string()
}

fn default_link_prefix() -> String {
    "https://hvr".to_string()
}

fn default_phrases() -> Vec<String> {
    vec![r"signing bonus".to_string(), r"sign[-\s]?on bonus".to_string()]
}

fn default_keyword() -> String {
    "bonus".to_string()
}

fn default_amounts() -> Vec<String> {
    ["1000", "1500", "2000", "2500", "3000"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_page_timeout_secs() -> u64 {
    15
}

fn default_root_timeout_secs() -> u64 {
    60
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout_secs() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

impl WatchConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            locale: default_locale(),
            locale_key: default_locale_key(),
            link_prefix: default_link_prefix(),
            rules: RuleConfig::default(),
            page_timeout_secs: default_page_timeout_secs(),
            root_timeout_secs: default_root_timeout_secs(),
            renderer: RendererKind::default(),
            webdriver_url: default_webdriver_url(),
            headless: true,
            accept_language: default_accept_language(),
            telegram: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|e| WatchError::Config(format!("{}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WatchError::Config(e.to_string()))
    }

    /// Build configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// `START_URL` is required. `TG_BOT_TOKEN` and `TG_CHANNEL_ID` must be
    /// set together. `WEBDRIVER_URL`, `WATCH_LOCALE` and `WATCH_LINK_PREFIX`
    /// override their defaults when non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let start_url =
            var("START_URL").ok_or_else(|| WatchError::Config("START_URL is not set".into()))?;
        let mut config = Self::new(&start_url);

        if let Some(webdriver_url) = var("WEBDRIVER_URL") {
            config.webdriver_url = webdriver_url;
        }
        if let Some(locale) = var("WATCH_LOCALE") {
            config.locale = locale;
        }
        if let Some(prefix) = var("WATCH_LINK_PREFIX") {
            config.link_prefix = prefix;
        }

        config.telegram = match (var("TG_BOT_TOKEN"), var("TG_CHANNEL_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig::new(&token, &chat_id)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(WatchError::Config(
                    "TG_BOT_TOKEN is set but TG_CHANNEL_ID is not".into(),
                ));
            }
            (None, Some(_)) => {
                return Err(WatchError::Config(
                    "TG_CHANNEL_ID is set but TG_BOT_TOKEN is not".into(),
                ));
            }
        };

        Ok(config)
    }

    /// Check every field up front so a run never starts half-configured
    pub fn validate(&self) -> Result<()> {
        let start = Url::parse(&self.start_url)
            .map_err(|e| WatchError::Config(format!("start_url '{}': {}", self.start_url, e)))?;
        if start.host_str().is_none() {
            return Err(WatchError::Config(format!(
                "start_url '{}' has no host",
                self.start_url
            )));
        }

        require_non_empty("locale", &self.locale)?;
        require_non_empty("locale_key", &self.locale_key)?;
        require_non_empty("link_prefix", &self.link_prefix)?;
        require_non_empty("rules.keyword", &self.rules.keyword)?;

        if self.rules.phrases.is_empty() {
            return Err(WatchError::Config("rules.phrases is empty".into()));
        }
        for pattern in self.rules.phrases.iter().chain([&self.rules.keyword]) {
            Regex::new(pattern)
                .map_err(|e| WatchError::Config(format!("pattern '{}': {}", pattern, e)))?;
        }

        if self.rules.amounts.is_empty() {
            return Err(WatchError::Config("rules.amounts is empty".into()));
        }
        for amount in &self.rules.amounts {
            if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
                return Err(WatchError::Config(format!(
                    "amount '{}' must contain digits only",
                    amount
                )));
            }
        }

        if self.page_timeout_secs == 0 || self.root_timeout_secs == 0 {
            return Err(WatchError::Config("timeouts must be positive".into()));
        }

        if self.renderer == RendererKind::WebDriver {
            require_non_empty("webdriver_url", &self.webdriver_url)?;
        }

        if let Some(telegram) = &self.telegram {
            require_non_empty("telegram.bot_token", &telegram.bot_token)?;
            require_non_empty("telegram.chat_id", &telegram.chat_id)?;
            require_non_empty("telegram.api_base", &telegram.api_base)?;
        }

        Ok(())
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn root_timeout(&self) -> Duration {
        Duration::from_secs(self.root_timeout_secs)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WatchError::Config(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = WatchConfig::from_json(r#"{"start_url": "https://jobs.example.com/de"}"#)
            .unwrap();

        assert_eq!(config.locale, "en_US");
        assert_eq!(config.locale_key, "setlang");
        assert_eq!(config.link_prefix, "https://hvr");
        assert_eq!(config.rules.amounts.len(), 5);
        assert_eq!(config.page_timeout_secs, 15);
        assert_eq!(config.renderer, RendererKind::WebDriver);
        assert!(config.headless);
        assert!(config.telegram.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_overrides() {
        let json = r#"{
            "start_url": "https://jobs.example.com/de",
            "locale": "de_DE",
            "renderer": "http",
            "rules": { "amounts": ["500"] },
            "telegram": { "bot_token": "abc", "chat_id": "@jobs" }
        }"#;
        let config = WatchConfig::from_json(json).unwrap();

        assert_eq!(config.locale, "de_DE");
        assert_eq!(config.renderer, RendererKind::Http);
        assert_eq!(config.rules.amounts, vec!["500"]);
        assert_eq!(config.rules.keyword, "bonus");

        let telegram = config.telegram.unwrap();
        assert!(telegram.html);
        assert_eq!(telegram.api_base, "https://api.telegram.org");
    }

    #[test]
    fn test_missing_start_url_is_config_error() {
        let result = WatchConfig::from_json("{}");
        assert!(matches!(result, Err(WatchError::Config(_))));

        let result = WatchConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(WatchError::Config(_))));
    }

    #[test]
    fn test_from_lookup() {
        let config = WatchConfig::from_lookup(lookup(&[
            ("START_URL", "https://jobs.example.com/de"),
            ("TG_BOT_TOKEN", "token"),
            ("TG_CHANNEL_ID", "-100123"),
            ("WEBDRIVER_URL", "http://localhost:9515"),
            ("WATCH_LOCALE", ""),
        ]))
        .unwrap();

        assert_eq!(config.start_url, "https://jobs.example.com/de");
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.locale, "en_US");

        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.bot_token, "token");
        assert_eq!(telegram.chat_id, "-100123");
    }

    #[test]
    fn test_partial_telegram_env_is_rejected() {
        let result = WatchConfig::from_lookup(lookup(&[
            ("START_URL", "https://jobs.example.com/de"),
            ("TG_BOT_TOKEN", "token"),
        ]));
        assert!(matches!(result, Err(WatchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut config = WatchConfig::new("not a url");
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));

        config = WatchConfig::new("https://jobs.example.com");
        config.rules.amounts = vec!["2,000".to_string()];
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));

        config = WatchConfig::new("https://jobs.example.com");
        config.rules.phrases = vec!["(unclosed".to_string()];
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));

        config = WatchConfig::new("https://jobs.example.com");
        config.page_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));

        config = WatchConfig::new("https://jobs.example.com");
        config.locale = " ".to_string();
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));

        config = WatchConfig::new("https://jobs.example.com");
        config.telegram = Some(TelegramConfig::new("", "chat"));
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));
    }
}
