use thiserror::Error;

/// Errors produced while configuring or running a watch
#[derive(Debug, Error)]
pub enum WatchError {
    /// Missing or invalid configuration, raised before anything is rendered
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A page could not be loaded by the renderer
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    /// A page did not finish loading within its time limit
    #[error("timed out after {secs}s loading {url}")]
    Timeout { url: String, secs: u64 },

    /// A URL could not be parsed into scheme/host/path/query
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A match pattern failed to compile
    #[error("failed to build match pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The notification endpoint rejected or garbled a delivery
    #[error("notification failed: {0}")]
    Transport(String),
}

impl WatchError {
    /// Shorthand for a load failure on `url`
    pub fn load(url: &str, reason: impl ToString) -> Self {
        WatchError::Load {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
