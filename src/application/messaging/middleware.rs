//! Middleware system for message processing pipeline

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use crate::domain::entities::Message;

/// Middleware trait - transforms inbound messages or drops them.
///
/// Returning `None` halts the pipeline; no command or fallback runs for the
/// message.
pub trait Middleware: Send + Sync {
    fn process(&self, message: Message) -> Option<Message>;

    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Middleware for F
where
    F: Fn(Message) -> Option<Message> + Send + Sync,
{
    fn process(&self, message: Message) -> Option<Message> {
        self(message)
    }
}

/// Ordered list of middleware applied to every inbound message
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.push(middleware);
        self
    }

    pub fn push<M: Middleware + 'static>(&mut self, middleware: M) {
        tracing::debug!("Middleware {} added", middleware.name());
        self.middlewares.push(Arc::new(middleware));
    }

    /// Fold the message through every middleware in registration order.
    pub fn run(&self, message: Message) -> Option<Message> {
        self.middlewares.iter().try_fold(message, |message, middleware| {
            tracing::debug!("Ran middleware: {} on {}", middleware.name(), message);
            let result = middleware.process(message);
            if result.is_none() {
                tracing::debug!("Message dropped by middleware {}", middleware.name());
            }
            result
        })
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

/// Rate limit middleware: drops messages from users over the limit
pub struct RateLimitMiddleware {
    requests: Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimitMiddleware {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    fn allow(&self, key: &str) -> bool {
        let mut requests = match self.requests.lock() {
            Ok(requests) => requests,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let times = requests.entry(key.to_string()).or_default();

        // Remove old requests outside the window
        times.retain(|&t| now.duration_since(t) < self.window);

        if times.len() >= self.max_requests as usize {
            return false;
        }

        times.push(now);
        true
    }
}

impl Middleware for RateLimitMiddleware {
    fn process(&self, message: Message) -> Option<Message> {
        if self.allow(&message.user) {
            Some(message)
        } else {
            tracing::warn!("[{}] Rate limited user {}", message.channel, message.user);
            None
        }
    }

    fn name(&self) -> &str {
        "rate-limit"
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, message: Message) -> Option<Message> {
        let preview: String = message.text.chars().take(50).collect();
        tracing::debug!("[{}] {}: {}", message.channel, message.user, preview);
        Some(message)
    }

    fn name(&self) -> &str {
        "logging"
    }
}
