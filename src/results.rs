use crate::error::WatchError;
use crate::matcher::Verdict;
use serde::Serialize;

/// A locale-normalized job link whose page satisfied the match rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedLink {
    /// Normalized URL of the page
    pub url: String,

    /// Which rule matched
    pub verdict: Verdict,
}

impl MatchedLink {
    pub fn new(url: String, verdict: Verdict) -> Self {
        Self { url, verdict }
    }
}

/// Result of visiting one candidate link
#[derive(Debug)]
pub enum VisitOutcome {
    Matched(MatchedLink),
    /// Page loaded but did not match
    Unmatched { url: String },
    /// Page could not be normalized or loaded; the run continues without it
    Failed { url: String, error: WatchError },
}

impl VisitOutcome {
    pub fn into_match(self) -> Option<MatchedLink> {
        match self {
            VisitOutcome::Matched(link) => Some(link),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, VisitOutcome::Failed { .. })
    }
}
