pub mod telegram;

use crate::error::Result;
use async_trait::async_trait;

pub use telegram::TelegramNotifier;

/// Capability that delivers the matched links of a run
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `links` in order, returning the transport's acknowledgment id if any
    async fn notify(&self, links: &[String]) -> Result<Option<String>>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Box<N> {
    async fn notify(&self, links: &[String]) -> Result<Option<String>> {
        (**self).notify(links).await
    }
}

/// Stream the console listing is written to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    /// Keeps stdout free for machine-readable output
    Stderr,
}

/// Prints matched links to the console
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    target: ConsoleTarget,
}

impl ConsoleNotifier {
    pub fn new(target: ConsoleTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, links: &[String]) -> Result<Option<String>> {
        let listing = format_listing(links);
        match self.target {
            ConsoleTarget::Stdout => print!("{}", listing),
            ConsoleTarget::Stderr => eprint!("{}", listing),
        }
        Ok(None)
    }
}

/// `Matched Links:` header followed by one URL per line
pub fn format_listing(links: &[String]) -> String {
    let mut out = String::from("\nMatched Links:\n");
    for link in links {
        out.push_str(link);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_listing() {
        let links = vec![
            "https://hvr.example.com/1?setlang=en_US".to_string(),
            "https://hvr.example.com/2?setlang=en_US".to_string(),
        ];
        assert_eq!(
            format_listing(&links),
            "\nMatched Links:\n\
             https://hvr.example.com/1?setlang=en_US\n\
             https://hvr.example.com/2?setlang=en_US\n"
        );
    }
}
