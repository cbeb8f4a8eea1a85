//! Watches a job landing page for postings that advertise a bonus.
//!
//! A run renders the landing page, collects the job links under a fixed
//! prefix, renders each one in a canonical locale and reports the pages whose
//! text mentions a signing bonus or a bonus with a known amount.

pub mod config;
pub mod error;
pub mod filter;
pub mod locale;
pub mod matcher;
pub mod notify;
pub mod parsers;
pub mod renderers;
pub mod results;
pub mod watcher;

// Re-export commonly used types for convenience
pub use config::{RendererKind, WatchConfig};
pub use error::{Result, WatchError};
pub use matcher::{MatchRule, Verdict};
pub use results::MatchedLink;
pub use watcher::Watcher;

use notify::{ConsoleNotifier, ConsoleTarget, Notifier, TelegramNotifier};
use renderers::{HttpRenderer, Renderer, WebDriverRenderer};
use watcher::WatchPlan;

/// Run one crawl with the renderer and notifier the configuration selects
///
/// Configuration is validated before any page is loaded. Matches go to
/// Telegram when configured, otherwise to stdout.
pub async fn run_crawl(config: &WatchConfig) -> Result<Vec<MatchedLink>> {
    run_crawl_with(config, ConsoleTarget::Stdout).await
}

/// Like [`run_crawl`], printing the console listing to `listing` when
/// Telegram is not configured
pub async fn run_crawl_with(
    config: &WatchConfig,
    listing: ConsoleTarget,
) -> Result<Vec<MatchedLink>> {
    // Everything fallible runs before a browser session is opened
    let plan = WatchPlan::new(config)?;
    let notifier = select_notifier(config, listing)?;

    let renderer: Box<dyn Renderer> = match config.renderer {
        RendererKind::WebDriver => Box::new(WebDriverRenderer::connect(config).await?),
        RendererKind::Http => Box::new(HttpRenderer::new(config)?),
    };

    plan.into_watcher(renderer, notifier).run().await
}

/// Telegram when configured, otherwise a console listing on `listing`
pub fn select_notifier(config: &WatchConfig, listing: ConsoleTarget) -> Result<Box<dyn Notifier>> {
    let notifier: Box<dyn Notifier> = match &config.telegram {
        Some(telegram) => Box::new(TelegramNotifier::new(telegram)?),
        None => Box::new(ConsoleNotifier::new(listing)),
    };
    Ok(notifier)
}
