use thiserror::Error;

/// Everything that can go wrong talking to the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,

    #[error("server error: {0}")]
    Server(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl GatewayError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() || err.is_request() {
            GatewayError::Network(err.to_string())
        } else if err.is_decode() || err.is_body() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Unknown(err.to_string())
        }
    }

    /// Plain-language text for the chat bubble
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Timeout => {
                "The request timed out before the server answered. Please try again in a moment."
                    .to_string()
            }
            GatewayError::Server(text) => format!("The server reported an error: {}", text),
            GatewayError::Network(_) => {
                "I couldn't reach the server. Check your connection and that the backend is running."
                    .to_string()
            }
            GatewayError::MalformedResponse(_) => {
                "The server sent a response I couldn't understand.".to_string()
            }
            GatewayError::Unknown(_) => {
                "Sorry, I encountered an error. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_and_network_messages_differ() {
        let timeout = GatewayError::Timeout.user_message();
        let network = GatewayError::Network("refused".into()).user_message();

        assert!(timeout.contains("timed out"));
        assert!(!network.contains("timed out"));
        assert!(network.contains("couldn't reach"));
        assert_ne!(timeout, network);
    }

    #[test]
    fn test_server_message_includes_server_text() {
        let msg = GatewayError::Server("index not built".into()).user_message();
        assert!(msg.contains("index not built"));
    }

    #[test]
    fn test_every_variant_has_text() {
        let all = [
            GatewayError::Timeout,
            GatewayError::Server("x".into()),
            GatewayError::Network("x".into()),
            GatewayError::MalformedResponse("x".into()),
            GatewayError::Unknown("x".into()),
        ];
        for err in all {
            assert!(!err.user_message().is_empty());
        }
    }
}
