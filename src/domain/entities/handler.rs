//! Command handlers, their declared parameters and invocation context

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{CommandRegistry, Message, Reply, Response, State};
use crate::application::errors::BotError;

/// Handler result
pub type HandlerResult = Result<Reply, BotError>;

/// Handler function type
pub type HandlerFn = dyn Fn(&Context<'_>, &Args) -> HandlerResult + Send + Sync;

/// Declared scalar type of a handler parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Float,
    Bool,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Str => "str",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated handler argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Float(v) => write!(f, "{}", v),
            ArgValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

/// A declared handler parameter: name, optional scalar type, optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: Option<ParamKind>,
    pub default: Option<ArgValue>,
}

impl Param {
    /// An untyped parameter; the captured text is passed through unchanged.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            default: None,
        }
    }

    pub fn str(name: impl Into<String>) -> Self {
        Self::new(name).of_kind(ParamKind::Str)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name).of_kind(ParamKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name).of_kind(ParamKind::Float)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name).of_kind(ParamKind::Bool)
    }

    pub fn of_kind(mut self, kind: ParamKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Arguments produced by validation, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: HashMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ArgValue::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_float)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ArgValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named handler function together with its parameter declarations.
#[derive(Clone)]
pub struct Handler {
    name: String,
    description: Option<String>,
    params: Vec<Param>,
    func: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Context<'_>, &Args) -> Result<R, BotError> + Send + Sync + 'static,
        R: Into<Reply>,
    {
        let func: Arc<HandlerFn> = Arc::new(move |ctx: &Context<'_>, args: &Args| f(ctx, args).map(Into::into));
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            func,
        }
    }

    /// Help text shown by the built-in help command.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Names of the parameters that carry a default value.
    pub fn defaulted_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.default.is_some())
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn call(&self, ctx: &Context<'_>, args: &Args) -> HandlerResult {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Everything a handler may need about the message being handled.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    message: &'a Message,
    registry: &'a CommandRegistry,
    state: &'a State,
    command: Option<&'a str>,
}

impl<'a> Context<'a> {
    pub fn new(message: &'a Message, registry: &'a CommandRegistry, state: &'a State) -> Self {
        Self {
            message,
            registry,
            state,
            command: None,
        }
    }

    pub fn for_command(mut self, template: &'a str) -> Self {
        self.command = Some(template);
        self
    }

    pub fn message(&self) -> &'a Message {
        self.message
    }

    pub fn channel(&self) -> &'a str {
        &self.message.channel
    }

    pub fn user(&self) -> &'a str {
        &self.message.user
    }

    pub fn timestamp(&self) -> &'a str {
        &self.message.timestamp
    }

    pub fn registry(&self) -> &'a CommandRegistry {
        self.registry
    }

    pub fn state(&self) -> &'a State {
        self.state
    }

    /// Template of the matched command; `None` inside the fallback handler.
    pub fn command(&self) -> Option<&'a str> {
        self.command
    }

    /// A response addressed to the originating channel.
    pub fn respond(&self) -> Response {
        Response::new(self.channel())
    }

    /// A threaded reply to the originating message.
    pub fn reply_in_thread(&self, text: impl Into<String>) -> Response {
        self.respond().with_text(text).in_thread(self.timestamp())
    }

    /// A reaction on the originating message.
    pub fn react(&self, emoji: impl Into<String>) -> Response {
        self.respond().in_thread(self.timestamp()).with_reaction(emoji)
    }
}
