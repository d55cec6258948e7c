use std::fmt;

/// Classified failure of a gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, timeout, ...).
    Transport(String),
    /// The server answered with a non-2xx status.
    Status { status: u16, message: Option<String> },
    /// The response body could not be decoded into an entity.
    Decode(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "transport error: {}", msg),
            GatewayError::Status {
                status,
                message: Some(message),
            } => write!(f, "server returned {}: {}", status, message),
            GatewayError::Status {
                status,
                message: None,
            } => write!(f, "server returned {}", status),
            GatewayError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

impl GatewayError {
    /// Message the server wants shown to the user, if it sent a non-blank one.
    ///
    /// Transport and decode failures return `None`; the store shows its own
    /// fallback text instead of a raw error.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            GatewayError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
