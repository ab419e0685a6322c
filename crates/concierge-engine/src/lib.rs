//! concierge-engine: Headless conversation engine for the investment assistant
//!
//! This crate provides the chat panel's turn-taking core, including:
//! - The ordered, observable conversation store
//! - The turn controller (pending input, submission, deferred replies)
//! - Quick-action shortcuts
//! - The conversation-service contract for the production reply path
//! - Configuration and the static property profile

pub mod config;
pub mod controller;
pub mod message;
pub mod property;
pub mod quick_action;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{Config, ConfigError, ReplyConfig, ReplyMode};
pub use controller::{ControllerError, ReplyBackend, TurnController, TurnEvent, TurnId};
pub use message::{Message, MessageId, MessageIdGenerator, Role};
pub use property::{Figure, PropertyProfile};
pub use quick_action::{invest_prompt, QuickAction, QuickActionTarget};
pub use service::{ConversationService, ServiceError, ServiceMessage, ServiceRequest};
pub use store::ConversationStore;

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
