use bonus_watch::{RendererKind, WatchConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bonus-watch")]
#[command(about = "Scans job postings linked from a landing page for sign-on bonuses")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (defaults to environment variables)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Landing page to collect job links from
    #[arg(long)]
    pub start_url: Option<String>,

    /// Locale every job page is rendered in
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Only visit links starting with this prefix
    #[arg(long)]
    pub link_prefix: Option<String>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Per-page timeout in seconds
    #[arg(long)]
    pub page_timeout: Option<u64>,

    /// Page renderer backend
    #[arg(short, long, value_enum)]
    pub renderer: Option<RendererArg>,

    /// Print matches instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,

    /// Print matches as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RendererArg {
    Webdriver,
    Http,
}

/// Convert from CLI argument renderer to internal renderer kind
pub fn convert_renderer(arg: RendererArg) -> RendererKind {
    match arg {
        RendererArg::Webdriver => RendererKind::WebDriver,
        RendererArg::Http => RendererKind::Http,
    }
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut WatchConfig) {
        if let Some(start_url) = &self.start_url {
            config.start_url = start_url.clone();
        }
        if let Some(locale) = &self.locale {
            config.locale = locale.clone();
        }
        if let Some(prefix) = &self.link_prefix {
            config.link_prefix = prefix.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(secs) = self.page_timeout {
            config.page_timeout_secs = secs;
        }
        if let Some(renderer) = self.renderer {
            config.renderer = convert_renderer(renderer);
        }
        if self.dry_run {
            config.telegram = None;
        }
    }
}
