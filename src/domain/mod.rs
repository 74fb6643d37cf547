//! Domain layer - Core objects and collaborator contracts
//! 
//! This layer contains:
//! - Entities: Messages, commands, patterns, handlers and responses
//! - Traits: Abstractions for infrastructure (Transport)

pub mod entities;
pub mod traits;
