use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures while deriving a signed broker credential
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Private key unreadable at {reference}: {reason}")]
    KeyUnreadable { reference: String, reason: String },

    #[error("Invalid private key material for {algorithm}: {reason}")]
    InvalidKeyMaterial { algorithm: String, reason: String },

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("JWT signing failed: {0}")]
    SigningFailed(String),
}

/// Failures while opening a broker connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Invalid broker endpoint: {0}")]
    InvalidEndpoint(String),

    /// Broker refused the connection; carries the broker's reason verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Broker unreachable: {0}")]
    Unreachable(String),

    #[error("Timed out connecting to broker after {0}s")]
    Timeout(u64),

    #[error("Broker session already in state {0}")]
    AlreadyConnected(String),

    #[error("Broker session already closed")]
    SessionClosed,
}

/// Failures while resolving the last known device position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location provider unavailable")]
    ProviderUnavailable,

    #[error("Location resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("Location resolution cancelled")]
    Cancelled,

    #[error("Location resolution timed out after {0}s")]
    TimedOut(u64),
}

impl LocationError {
    /// Whether the session lacks location capability altogether, as opposed
    /// to a single resolution attempt going wrong.
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            LocationError::PermissionDenied | LocationError::ProviderUnavailable
        )
    }
}

/// Failures while publishing a telemetry message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Not connected to broker")]
    NotConnected,

    #[error("Publish already attempted in this session")]
    AlreadyAttempted,

    #[error("Failed to encode telemetry payload: {0}")]
    Encoding(String),

    /// Broker refused the message; carries the broker's reason verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Transport failure during publish: {0}")]
    Transport(String),

    #[error("Timed out waiting for publish acknowledgement after {0}s")]
    Timeout(u64),
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job input: {0}")]
    InvalidJobInput(String),
}
