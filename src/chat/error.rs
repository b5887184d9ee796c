//! Errors a caller can correct, as opposed to server-side failures.

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message content is required")]
    EmptyMessage,
    #[error("session title cannot be empty")]
    EmptyTitle,
    #[error("chat session {0} not found")]
    SessionNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(
            ChatError::EmptyMessage.to_string(),
            "message content is required"
        );
        assert_eq!(
            ChatError::SessionNotFound("abc".to_string()).to_string(),
            "chat session abc not found"
        );
    }

    #[test]
    fn test_chat_error_survives_anyhow() {
        let err: anyhow::Error = ChatError::EmptyTitle.into();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::EmptyTitle)
        ));
    }
}
