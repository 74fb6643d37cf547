//! Domain entities - Core objects the dispatcher works with

pub mod command;
pub mod handler;
pub mod message;
pub mod pattern;
pub mod response;
pub mod state;

pub use command::{Command, CommandOptions, CommandRegistry};
pub use handler::{ArgValue, Args, Context, Handler, HandlerFn, HandlerResult, Param, ParamKind};
pub use message::Message;
pub use pattern::{Captures, Pattern};
pub use response::{Attachment, OutboundAction, OutgoingMessage, Reply, Response};
pub use state::State;
