use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::filter::LinkFilter;
use crate::locale::LocaleNormalizer;
use crate::matcher::MatchRule;
use crate::notify::Notifier;
use crate::renderers::{RenderedPage, Renderer};
use crate::results::{MatchedLink, VisitOutcome};
use std::time::Duration;
use tokio::time::timeout;

/// Everything a run needs that can be checked without a browser
///
/// Building the plan validates the configuration and compiles the match
/// rule, so nothing can fail between opening a render session and running.
#[derive(Debug, Clone)]
pub struct WatchPlan {
    start_url: String,
    links: LinkFilter,
    normalizer: LocaleNormalizer,
    rule: MatchRule,
    page_timeout: Duration,
    root_timeout: Duration,
}

impl WatchPlan {
    pub fn new(config: &WatchConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            start_url: config.start_url.clone(),
            links: LinkFilter::new(&config.link_prefix),
            normalizer: LocaleNormalizer::new(&config.locale_key, &config.locale),
            rule: MatchRule::from_config(&config.rules)?,
            page_timeout: config.page_timeout(),
            root_timeout: config.root_timeout(),
        })
    }

    /// Attach the collaborators; infallible so an open session is never leaked
    pub fn into_watcher<R: Renderer, N: Notifier>(self, renderer: R, notifier: N) -> Watcher<R, N> {
        Watcher {
            plan: self,
            renderer,
            notifier,
        }
    }
}

/// Drives one pass: landing page, candidate links, per-link match, notification
///
/// Pages are visited strictly one after another. A failure on a single link
/// is logged and skipped; only a failure on the landing page ends the run.
pub struct Watcher<R, N> {
    plan: WatchPlan,
    renderer: R,
    notifier: N,
}

impl<R: Renderer, N: Notifier> Watcher<R, N> {
    /// Build a watcher from a validated configuration
    pub fn new(config: &WatchConfig, renderer: R, notifier: N) -> Result<Self> {
        Ok(WatchPlan::new(config)?.into_watcher(renderer, notifier))
    }

    /// Run the crawl and return the matched links in visit order
    ///
    /// The renderer is closed before returning on every path. Notification
    /// failures are logged and do not affect the result.
    pub async fn run(&self) -> Result<Vec<MatchedLink>> {
        let scanned = self.scan().await;

        if let Err(e) = self.renderer.close().await {
            ::log::warn!("Failed to close renderer: {}", e);
        }

        let matched = scanned?;
        self.dispatch(&matched).await;
        Ok(matched)
    }

    async fn scan(&self) -> Result<Vec<MatchedLink>> {
        let plan = &self.plan;

        self.limit_page_load(plan.root_timeout).await;
        let root = self.render(&plan.start_url, plan.root_timeout).await?;
        ::log::info!("Opened: {}", plan.start_url);

        self.limit_page_load(plan.page_timeout).await;
        let candidates = plan.links.collect(&root);
        ::log::info!("Found {} useful links to visit.", candidates.len());

        let mut outcomes = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            outcomes.push(self.visit(candidate).await);
        }

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        let matched: Vec<MatchedLink> = outcomes
            .into_iter()
            .filter_map(VisitOutcome::into_match)
            .collect();

        ::log::info!(
            "Visited {} links: {} matched, {} failed",
            candidates.len(),
            matched.len(),
            failed
        );
        Ok(matched)
    }

    /// Visit a single candidate; never fails, failures come back as outcomes
    pub async fn visit(&self, candidate: &str) -> VisitOutcome {
        let url = match self.plan.normalizer.normalize(candidate) {
            Ok(url) => url,
            Err(error) => {
                ::log::warn!("Failed to visit {}: {}", candidate, error);
                return VisitOutcome::Failed {
                    url: candidate.to_string(),
                    error,
                };
            }
        };

        ::log::debug!("Visiting {}", url);
        let page = match self.render(&url, self.plan.page_timeout).await {
            Ok(page) => page,
            Err(error) => {
                ::log::warn!("Failed to visit {}: {}", candidate, error);
                return VisitOutcome::Failed { url, error };
            }
        };

        let verdict = self.plan.rule.evaluate(&page.text);
        if verdict.is_match() {
            ::log::info!("Matched {} ({:?})", url, verdict);
            VisitOutcome::Matched(MatchedLink::new(url, verdict))
        } else {
            ::log::debug!("No match on {}", url);
            VisitOutcome::Unmatched { url }
        }
    }

    /// Ask the renderer to abort loads itself, so a stalled page cannot hold
    /// the session past its own time limit
    async fn limit_page_load(&self, limit: Duration) {
        if let Err(e) = self.renderer.set_page_load_timeout(limit).await {
            ::log::warn!("Failed to set page load timeout: {}", e);
        }
    }

    async fn render(&self, url: &str, limit: Duration) -> Result<RenderedPage> {
        match timeout(limit, self.renderer.render(url)).await {
            Ok(result) => result,
            Err(_) => Err(WatchError::Timeout {
                url: url.to_string(),
                secs: limit.as_secs(),
            }),
        }
    }

    async fn dispatch(&self, matched: &[MatchedLink]) {
        if matched.is_empty() {
            ::log::info!("No matching links; nothing to send");
            return;
        }

        let urls: Vec<String> = matched.iter().map(|m| m.url.clone()).collect();
        match self.notifier.notify(&urls).await {
            Ok(_) => ::log::info!("Notified {} matched links", urls.len()),
            Err(e) => ::log::error!("Failed to send notification: {}", e),
        }
    }
}
