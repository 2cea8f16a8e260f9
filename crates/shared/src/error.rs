use thiserror::Error;

/// Failure of a single catalog fetch. Carried inside view state, so it stays
/// `Clone` and keeps only rendered messages rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response payload: {0}")]
    Decode(String),
    #[error("no meal found for id {id}")]
    NotFound { id: String },
    #[error("failed to read fixture '{path}': {reason}")]
    File { path: String, reason: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}
