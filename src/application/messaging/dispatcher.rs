//! Message dispatcher - Routes messages to handlers
//!
//! Every inbound message is taken through the same steps, synchronously:
//! middleware, bot-message filter, prefix check, command lookup in
//! registration order, argument validation, handler invocation and reply
//! normalization. Messages that match no command go to the fallback handler
//! if one is registered.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::middleware::{Middleware, MiddlewareChain};
use super::response::normalize;
use super::validator::validate_args;
use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{
    CommandOptions, CommandRegistry, Context, Handler, HandlerResult, Message, OutboundAction, OutgoingMessage, State,
};

/// Fallback handler type, invoked with the unmatched message
pub type FallbackFn = dyn Fn(&Context<'_>) -> HandlerResult + Send + Sync;

/// Where a message's trip through the dispatcher ended
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A middleware dropped the message
    Intercepted,
    /// The message was posted by a bot
    FromBot,
    /// The message does not start with the configured prefix
    MissingPrefix,
    /// Nothing matched and there is no fallback
    Unmatched,
    /// A command or the fallback (`command: None`) ran
    Invoked {
        command: Option<String>,
        action: Option<OutboundAction>,
    },
    /// Arguments or the returned response were invalid; the error text is the reply
    Rejected {
        command: Option<String>,
        action: OutboundAction,
    },
    /// The handler itself failed; logged, nothing is sent
    Failed { command: Option<String>, error: String },
}

impl Dispatch {
    /// The outbound action to perform, if any.
    pub fn action(&self) -> Option<&OutboundAction> {
        match self {
            Dispatch::Invoked { action, .. } => action.as_ref(),
            Dispatch::Rejected { action, .. } => Some(action),
            _ => None,
        }
    }

    /// Text of the reply, if the outcome is a plain message.
    pub fn reply_text(&self) -> Option<&str> {
        self.action().and_then(OutboundAction::text)
    }
}

/// Message dispatcher - routes messages through middleware to handlers
#[derive(Default)]
pub struct MessageDispatcher {
    registry: CommandRegistry,
    middleware: MiddlewareChain,
    fallback: Option<Arc<FallbackFn>>,
    state: State,
}

impl MessageDispatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(prefix),
            ..Default::default()
        }
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.add_middleware(middleware);
        self
    }

    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middleware.push(middleware);
    }

    /// Register a command handler
    pub fn register_command(&mut self, template: &str, handler: Handler, options: CommandOptions) -> Result<(), CommandError> {
        self.registry.register(template, handler, options)
    }

    pub fn register_alias(&mut self, template: &str) -> Result<(), CommandError> {
        self.registry.register_alias(template)
    }

    /// Replace the fallback handler
    pub fn set_fallback<F>(&mut self, fallback: F)
    where
        F: Fn(&Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Process a message through the dispatcher
    pub fn dispatch(&self, message: Message) -> Dispatch {
        let Some(message) = self.middleware.run(message) else {
            return Dispatch::Intercepted;
        };

        if message.is_from_bot() {
            return Dispatch::FromBot;
        }

        if let Some(prefix) = self.registry.prefix() {
            if !message.text.starts_with(prefix) {
                return Dispatch::MissingPrefix;
            }
        }

        if let Some((command, captures)) = self.registry.find(&message.text) {
            let template = command.template().to_string();
            let handler = command.handler();
            let args = match validate_args(handler, &captures) {
                Ok(args) => args,
                Err(e) => {
                    tracing::debug!("Rejected arguments for {}: {}", template, e);
                    return Dispatch::Rejected {
                        action: error_reply(&message, &e.to_string()),
                        command: Some(template),
                    };
                }
            };

            let ctx = Context::new(&message, &self.registry, &self.state).for_command(command.template());
            let result = contain_panic(handler.name(), || handler.call(&ctx, &args));
            tracing::debug!("Ran command: {} on {}", handler.name(), message);
            return respond(Some(template), result, &message);
        }

        tracing::warn!("Command {} not found", message.text);
        match &self.fallback {
            Some(fallback) => {
                let ctx = Context::new(&message, &self.registry, &self.state);
                respond(None, contain_panic("fallback", || fallback(&ctx)), &message)
            }
            None => Dispatch::Unmatched,
        }
    }
}

/// Turn a panicking handler into an error so the dispatch loop carries on.
fn contain_panic<F>(name: &str, call: F) -> HandlerResult
where
    F: FnOnce() -> HandlerResult,
{
    catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| Err(BotError::Internal(format!("Handler {} panicked", name))))
}

fn respond(command: Option<String>, result: HandlerResult, message: &Message) -> Dispatch {
    let reply = match result {
        Ok(reply) => reply,
        Err(BotError::Argument(e)) => {
            return Dispatch::Rejected {
                command,
                action: error_reply(message, &e.to_string()),
            }
        }
        Err(e) => {
            tracing::error!(
                "Handler {} failed on {}: {}",
                command.as_deref().unwrap_or("fallback"),
                message,
                e
            );
            return Dispatch::Failed {
                command,
                error: e.to_string(),
            };
        }
    };

    match normalize(reply, &message.channel) {
        Ok(action) => Dispatch::Invoked { command, action },
        Err(e) => {
            tracing::warn!("Invalid response from {}: {}", command.as_deref().unwrap_or("fallback"), e);
            Dispatch::Rejected {
                command,
                action: error_reply(message, &e.to_string()),
            }
        }
    }
}

fn error_reply(message: &Message, text: &str) -> OutboundAction {
    OutboundAction::SendMessage(OutgoingMessage::text(&message.channel, text))
}
