//! Console adapter for development/testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{Message, OutgoingMessage};
use crate::domain::traits::{BotInfo, Inbound, Transport};

const CONSOLE_CHANNEL: &str = "console";

/// Console transport: each stdin line is a message, replies go to stdout
pub struct ConsoleAdapter {
    info: BotInfo,
    user: String,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
            },
            user: std::env::var("USER").unwrap_or_else(|_| "console-user".to_string()),
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

/// Slack-style `seconds.micros` timestamp
fn timestamp(now: DateTime<Utc>) -> String {
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

fn render(message: &OutgoingMessage) -> String {
    let mut out = String::from("[BOT]");
    if let Some(user) = &message.ephemeral_user {
        out.push_str(&format!(" (only {})", user));
    }
    if let Some(ts) = &message.thread_ts {
        out.push_str(&format!(" (thread {})", ts));
    }
    if let Some(text) = &message.text {
        out.push(' ');
        out.push_str(text);
    }
    for attachment in &message.attachments {
        out.push_str(&format!("\n  [Attachment] {}", attachment));
    }
    out
}

#[async_trait]
impl Transport for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode), type a command and press enter");
        Ok(())
    }

    async fn next_message(&self) -> Result<Inbound, BotError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => {
                let text = line.trim();
                if text.is_empty() {
                    return Ok(Inbound::Idle);
                }
                Ok(Inbound::Message(Message::new(
                    text,
                    CONSOLE_CHANNEL,
                    self.user.as_str(),
                    timestamp(Utc::now()),
                )))
            }
            Ok(None) => Ok(Inbound::Closed),
            Err(e) => Err(BotError::Transport(format!("Failed to read stdin: {}", e))),
        }
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), BotError> {
        println!("{}", render(message));
        Ok(())
    }

    async fn send_reaction(&self, _channel: &str, timestamp: &str, emoji: &str) -> Result<(), BotError> {
        println!("[REACTION :{}:] on {}", emoji, timestamp);
        Ok(())
    }

    async fn upload_file(&self, _channel: &str, filename: &str, content: &[u8]) -> Result<(), BotError> {
        println!("[FILE] {} ({} bytes)", filename, content.len());
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
