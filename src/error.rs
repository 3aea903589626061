//! Error types for the intake chat.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Errors raised while posting the collected answers to the intake endpoint.
///
/// These never leave the controller; they are logged where the request is made.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid intake endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Intake endpoint rejected submission with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
