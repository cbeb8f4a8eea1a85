use bonus_watch::notify::ConsoleTarget;
use bonus_watch::{MatchedLink, WatchConfig, WatchError};
use clap::Parser;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Pick up TG_BOT_TOKEN, START_URL etc. from a .env file if present
    if let Err(e) = dotenvy::dotenv() {
        ::log::debug!("No .env file loaded: {}", e);
    }

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!("Starting watch for: {}", config.start_url);
    let start_time = std::time::Instant::now();

    match bonus_watch::run_crawl_with(&config, listing_target(&args)).await {
        Ok(matched) => {
            ::log::info!(
                "Watch complete - {} matches in {:.2} seconds",
                matched.len(),
                start_time.elapsed().as_secs_f64()
            );
            if args.json {
                match matches_json(&matched) {
                    Ok(json) => println!("{}", json),
                    Err(e) => ::log::error!("Failed to serialize matches: {}", e),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Watch failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// File if given, otherwise environment; then CLI overrides and validation
fn load_config(args: &Args) -> Result<WatchConfig, WatchError> {
    let mut config = match &args.config {
        Some(path) => WatchConfig::from_file(path)?,
        None if args.start_url.is_some() => {
            // START_URL may come from the command line alone
            WatchConfig::from_lookup(|key| match key {
                "START_URL" => args.start_url.clone(),
                _ => std::env::var(key).ok(),
            })?
        }
        None => WatchConfig::from_env()?,
    };

    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// With `--json`, stdout carries only the JSON document
fn listing_target(args: &Args) -> ConsoleTarget {
    if args.json {
        ConsoleTarget::Stderr
    } else {
        ConsoleTarget::Stdout
    }
}

fn matches_json(matched: &[MatchedLink]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonus_watch::Verdict;

    #[test]
    fn test_dry_run_json_keeps_stdout_parseable() {
        let args = Args::parse_from(["bonus-watch", "--dry-run", "--json"]);
        assert_eq!(listing_target(&args), ConsoleTarget::Stderr);

        let matched = vec![MatchedLink::new(
            "https://hvr.example.com/1?setlang=en_US".to_string(),
            Verdict::Phrase {
                phrase: "sign-on bonus".to_string(),
            },
        )];
        let stdout = matches_json(&matched).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(parsed[0]["url"], "https://hvr.example.com/1?setlang=en_US");
        assert_eq!(parsed[0]["verdict"]["rule"], "phrase");
    }

    #[test]
    fn test_listing_stays_on_stdout_without_json() {
        let args = Args::parse_from(["bonus-watch", "--dry-run"]);
        assert_eq!(listing_target(&args), ConsoleTarget::Stdout);
    }
}
