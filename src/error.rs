use crate::types::PollId;

/// Result type for poll operations
pub type PollResult<T> = Result<T, PollError>;

/// Errors that can occur while handling a poll command.
///
/// Every error is local to the command that produced it; the store validates
/// before mutating, so a failed command never leaves a poll half-updated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PollError {
    #[error("{0}")]
    Validation(String),

    #[error("Poll {0} not found")]
    NotFound(PollId),

    #[error("Poll {0} is already revealed")]
    Closed(PollId),

    #[error("Only the host can end poll {0}")]
    Unauthorized(PollId),
}

impl PollError {
    /// Stable code sent to clients in `ServerMessage::Error`
    pub fn code(&self) -> &'static str {
        match self {
            PollError::Validation(_) => "VALIDATION_ERROR",
            PollError::NotFound(_) => "POLL_NOT_FOUND",
            PollError::Closed(_) => "POLL_CLOSED",
            PollError::Unauthorized(_) => "UNAUTHORIZED",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        PollError::Validation(msg.into())
    }
}
