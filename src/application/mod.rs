//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Bot: Registration facade and host loop
//! - Errors: Domain-specific errors
//! - Messaging: Pattern matching, middleware, dispatching
//! - Scheduling: Recurring jobs

pub mod bot;
pub mod errors;
pub mod messaging;
pub mod scheduling;
