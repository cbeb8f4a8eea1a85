use crate::config::TelegramConfig;
use crate::error::{Result, WatchError};
use crate::notify::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sends matched links to a Telegram chat through the Bot API
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    html: bool,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WatchError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
            html: config.html,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, links: &[String]) -> Result<Option<String>> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: format_message(links, self.html),
            disable_web_page_preview: true,
            parse_mode: self.html.then_some("HTML"),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WatchError::Transport(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        let body: ApiResponse = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(WatchError::Transport(format!("HTTP {}", status)));
            }
            Err(e) => {
                return Err(WatchError::Transport(format!(
                    "unexpected response: {}",
                    e.without_url()
                )));
            }
        };

        if !body.ok {
            return Err(WatchError::Transport(format!(
                "Telegram error: {}",
                body.description.as_deref().unwrap_or("no description")
            )));
        }

        let message_id = body.result.map(|r| r.message_id.to_string());
        ::log::info!(
            "Sent. Message ID: {}",
            message_id.as_deref().unwrap_or("unknown")
        );
        Ok(message_id)
    }
}

/// Message body listing the links as `1- url`, one per line
pub fn format_message(links: &[String], html: bool) -> String {
    let list = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let link = if html {
                escape_html(link)
            } else {
                link.clone()
            };
            format!("{}- {}", i + 1, link)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let title = if html {
        "<b>Job Alert</b>"
    } else {
        "Job Alert"
    };
    format!(
        "{}\n\nCheck out these jobs with bonuses:\n\n{}",
        title, list
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> TelegramNotifier {
        let mut config = TelegramConfig::new("123:abc", "@jobs");
        config.api_base = server.uri();
        TelegramNotifier::new(&config).unwrap()
    }

    fn links() -> Vec<String> {
        vec![
            "https://hvr.example.com/1?setlang=en_US".to_string(),
            "https://hvr.example.com/2?id=4&setlang=en_US".to_string(),
        ]
    }

    #[test]
    fn test_format_message_html() {
        let text = format_message(&links(), true);
        assert_eq!(
            text,
            "<b>Job Alert</b>\n\nCheck out these jobs with bonuses:\n\n\
             1- https://hvr.example.com/1?setlang=en_US\n\
             2- https://hvr.example.com/2?id=4&amp;setlang=en_US"
        );
    }

    #[test]
    fn test_format_message_plain() {
        let text = format_message(&links()[..1], false);
        assert_eq!(
            text,
            "Job Alert\n\nCheck out these jobs with bonuses:\n\n\
             1- https://hvr.example.com/1?setlang=en_US"
        );
    }

    #[tokio::test]
    async fn test_notify_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "@jobs",
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true, "result": { "message_id": 42 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ack = notifier(&server).notify(&links()).await.unwrap();
        assert_eq!(ack.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_api_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: chat not found",
            })))
            .mount(&server)
            .await;

        let result = notifier(&server).notify(&links()).await;
        match result {
            Err(WatchError::Transport(message)) => assert!(message.contains("chat not found")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparsable_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let result = notifier(&server).notify(&links()).await;
        match result {
            Err(WatchError::Transport(message)) => assert!(message.contains("502")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
