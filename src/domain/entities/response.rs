//! Handler return values and the outbound actions they normalize into

use serde_json::Value;

/// A message, threaded reply, ephemeral message or reaction built by a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub channel: String,
    pub text: Option<String>,
    /// Timestamp of the message being answered. Threads text replies and
    /// identifies the target of a reaction.
    pub original_ts: Option<String>,
    /// Emoji name; only sent when `original_ts` is populated.
    pub reaction: Option<String>,
    /// Recipient of an ephemeral message.
    pub user: Option<String>,
    pub attachments: Vec<Value>,
    pub ephemeral: bool,
}

impl Response {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn in_thread(mut self, original_ts: impl Into<String>) -> Self {
        self.original_ts = Some(original_ts.into());
        self
    }

    pub fn with_reaction(mut self, emoji: impl Into<String>) -> Self {
        self.reaction = Some(emoji.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Value) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn ephemeral_to(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.ephemeral = true;
        self
    }
}

/// A file to upload to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub channel: String,
    pub filename: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(channel: impl Into<String>, filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            channel: channel.into(),
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// What a command or fallback handler produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Reply {
    #[default]
    Nothing,
    /// Plain text sent back to the originating channel
    Text(String),
    Response(Response),
    Upload(Attachment),
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Nothing
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Attachment> for Reply {
    fn from(attachment: Attachment) -> Self {
        Reply::Upload(attachment)
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A message ready for the transport's send call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: Option<String>,
    pub attachments: Vec<Value>,
    pub thread_ts: Option<String>,
    pub ephemeral_user: Option<String>,
}

impl OutgoingMessage {
    pub fn text(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: Some(text.into()),
            attachments: Vec::new(),
            thread_ts: None,
            ephemeral_user: None,
        }
    }
}

/// A single call the transport has to make.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundAction {
    SendMessage(OutgoingMessage),
    React {
        channel: String,
        timestamp: String,
        emoji: String,
    },
    Upload(Attachment),
}

impl OutboundAction {
    /// Text of a send-message action.
    pub fn text(&self) -> Option<&str> {
        match self {
            OutboundAction::SendMessage(msg) => msg.text.as_deref(),
            _ => None,
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            OutboundAction::SendMessage(msg) => &msg.channel,
            OutboundAction::React { channel, .. } => channel,
            OutboundAction::Upload(attachment) => &attachment.channel,
        }
    }
}
