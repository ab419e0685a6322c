//! Contract toward an external conversation service.
//!
//! In service mode every submission is forwarded here instead of producing
//! the local acknowledgment. The service owns inference, authentication and
//! message ids; the controller only appends what comes back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::controller::TurnId;
use crate::message::Message;

/// One outbound user message.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    /// Session key of the conversation the message belongs to.
    pub conversation_id: Uuid,
    /// Turn that produced the message.
    pub turn: TurnId,
    /// The user message as appended to the conversation.
    pub message: Message,
}

/// An assistant message returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    /// Service-issued identifier, used for deduplication.
    pub id: String,
    /// Message content.
    pub content: String,
}

impl ServiceMessage {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// A conversational backend.
///
/// Implementations return the assistant messages for one user message, in the
/// order they should be appended. A streamed response can be returned as
/// several messages.
#[async_trait]
pub trait ConversationService: Send + Sync {
    async fn send(&self, request: ServiceRequest) -> Result<Vec<ServiceMessage>, ServiceError>;
}

/// Errors reported by a conversation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The service did not answer in time.
    #[error("request timed out")]
    Timeout,
}
