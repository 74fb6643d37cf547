use async_trait::async_trait;
use crate::domain::entities::{Message, OutboundAction, OutgoingMessage};
use crate::application::errors::BotError;

/// What a transport yielded when asked for the next event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(Message),
    /// Nothing available right now
    Idle,
    /// The connection was closed and no further events will arrive
    Closed,
}

/// Transport trait - abstraction for chat platform connections
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the platform
    async fn start(&self) -> Result<(), BotError>;

    /// Wait for the next inbound event
    async fn next_message(&self) -> Result<Inbound, BotError>;

    /// Post a message, optionally threaded or ephemeral
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), BotError>;

    /// React to the message at `timestamp`
    async fn send_reaction(&self, channel: &str, timestamp: &str, emoji: &str) -> Result<(), BotError>;

    /// Upload a file to a channel
    async fn upload_file(&self, channel: &str, filename: &str, content: &[u8]) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;

    /// Carry out a normalized outbound action
    async fn perform(&self, action: &OutboundAction) -> Result<(), BotError> {
        match action {
            OutboundAction::SendMessage(message) => self.send_message(message).await,
            OutboundAction::React { channel, timestamp, emoji } => {
                self.send_reaction(channel, timestamp, emoji).await
            }
            OutboundAction::Upload(attachment) => {
                self.upload_file(&attachment.channel, &attachment.filename, &attachment.content)
                    .await
            }
        }
    }
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
}
