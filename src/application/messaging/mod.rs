//! Message handling - pattern matching, validation, middleware and dispatch

pub mod dispatcher;
pub mod help;
pub mod middleware;
pub mod response;
pub mod validator;

pub use dispatcher::{Dispatch, FallbackFn, MessageDispatcher};
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareChain, RateLimitMiddleware};
pub use response::normalize;
pub use validator::validate_args;
