//! Error types for ZK13

/// Main error types for the library.
///
/// [`Verifier::verify`](crate::Verifier::verify) never surfaces one of these: a
/// rejected proof is a `false` return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain parameter generation failed or ran out of attempts.
    #[error("Parameter generation failed: {0}")]
    Generation(String),

    /// Secure randomness could not be drawn.
    #[error("Secure randomness unavailable: {0}")]
    Randomness(String),

    /// Invalid group parameters or protocol inputs were provided.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// A proof could not be decoded or failed a check.
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// The replay guard holds its maximum number of consumed nonces.
    #[error("Replay guard has reached maximum capacity ({0})")]
    ReplayCapacity(usize),

    /// Parameter generation was cancelled by the caller.
    #[error("Parameter generation cancelled")]
    Cancelled,

    /// Configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using the library's error type.
pub type Result<T> = core::result::Result<T, Error>;
