//! phial - a small chat bot framework
//!
//! Commands are registered against `<name>` templates, inbound messages go
//! through a middleware chain and are routed to the first matching command,
//! and recurring jobs run on a scheduler polled alongside the message loop.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bot::{Bot, Outbox};
pub use application::errors::{ArgumentError, BotError, CommandError, ConfigError, ResponseError, ScheduleError};
pub use application::messaging::{
    Dispatch, LoggingMiddleware, MessageDispatcher, Middleware, MiddlewareChain, RateLimitMiddleware,
};
pub use application::scheduling::{Schedule, ScheduledJob, Scheduler};
pub use domain::entities::{
    ArgValue, Args, Attachment, Command, CommandOptions, CommandRegistry, Context, Handler, HandlerResult, Message,
    OutboundAction, OutgoingMessage, Param, ParamKind, Pattern, Reply, Response, State,
};
pub use domain::traits::{BotInfo, Inbound, Transport};
pub use infrastructure::config::Config;
