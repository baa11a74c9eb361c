//! Error types for a simulation run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Missing required environment variable: {0}")]
    MissingApiKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transmission failed: {0}")]
    Transport(String),

    #[error("Ingestion endpoint rejected batch (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PulseError {
    /// Configuration problems are raised before any simulation work.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PulseError::MissingApiKey(_) | PulseError::InvalidConfig(_)
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_config() {
            2
        } else {
            1
        }
    }
}

impl From<ureq::Error> for PulseError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                PulseError::Rejected { status, body }
            }
            ureq::Error::Transport(transport) => PulseError::Transport(transport.to_string()),
        }
    }
}

pub type PulseResult<T> = Result<T, PulseError>;
