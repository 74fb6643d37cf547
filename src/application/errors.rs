//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("{0}")]
    Argument(#[from] ArgumentError),

    #[error("{0}")]
    Response(#[from] ResponseError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Shorthand for handlers reporting their own failure.
    pub fn handler(msg: impl Into<String>) -> Self {
        BotError::Handler(msg.into())
    }
}

/// Command registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command {0} already exists")]
    Duplicate(String),

    #[error("Invalid pattern '{template}': {reason}")]
    Pattern { template: String, reason: String },

    #[error("No command registered to attach alias '{0}' to")]
    NoCommandForAlias(String),
}

/// Handler argument validation errors.
///
/// The display text is sent back to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Parameter {param} not provided to {handler}")]
    Missing { param: String, handler: String },

    #[error("{value} could not be converted to {target}")]
    Type { value: String, target: String },
}

/// A handler returned a response with mutually exclusive fields set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Response objects with an original timestamp can only have one of the attributes: Reaction, Text")]
    ReactionWithText,

    #[error("User not provided for ephemeral message")]
    EphemeralWithoutUser,
}

/// Schedule construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("'at' can only be used on day(s)")]
    AtWithoutDays,

    #[error("'at' can only be used on day(s), not hours or minutes")]
    AtWithSubDayOffset,

    #[error("'at' can only be set once")]
    AtAlreadySet,

    #[error("Invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u32, minute: u32, second: u32 },

    #[error("Schedule has no interval")]
    EmptyInterval,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
