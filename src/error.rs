use thiserror::Error;

/// Errors surfaced at the `PaymentsApi` seam.
///
/// `NotFound` is a control-flow signal for the ownership probe, not a fault:
/// a scoped fetch that misses simply means the payment lives elsewhere.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("api error ({code}): {message}")]
    Api { code: String, message: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Report(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
