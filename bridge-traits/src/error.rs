use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    /// The host rejected the call. The payload is the host's own message and
    /// is surfaced to callers untouched.
    #[error("{0}")]
    OperationFailed(String),
}

impl BridgeError {
    /// Message as the host reported it, without any bridge prefix.
    pub fn host_message(&self) -> String {
        match self {
            BridgeError::OperationFailed(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
