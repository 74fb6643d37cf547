use std::fmt;

/// An inbound chat message as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub channel: String,
    pub user: String,
    pub timestamp: String,
    pub team: Option<String>,
    /// Set when the message was posted by a bot; such messages are never dispatched.
    pub bot_id: Option<String>,
}

impl Message {
    pub fn new(
        text: impl Into<String>,
        channel: impl Into<String>,
        user: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            channel: channel.into(),
            user: user.into(),
            timestamp: timestamp.into(),
            team: None,
            bot_id: None,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.bot_id = Some(bot_id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Message: {} in {}:{} at {}>",
            self.text,
            self.channel,
            self.team.as_deref().unwrap_or("-"),
            self.timestamp
        )
    }
}
