use std::io::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpApiFsError {
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Invalid target {path}: {reason}")]
    InvalidTarget { path: String, reason: String },

    #[error("Destination already exists: {path}")]
    DestinationExists { path: String },

    #[error("Invalid wildcard '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Operation not supported: {op}")]
    Unsupported { op: String },

    #[error("Remote command '{cmd}' failed: {reason}")]
    Remote { cmd: String, reason: String },

    #[error("Remote command '{cmd}' returned an undecodable response: {source}")]
    Decode {
        cmd: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, HttpApiFsError>;

impl HttpApiFsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        HttpApiFsError::NotFound { path: path.into() }
    }

    pub fn invalid_target(path: impl Into<String>, reason: impl Into<String>) -> Self {
        HttpApiFsError::InvalidTarget {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn remote(cmd: impl Into<String>, reason: impl ToString) -> Self {
        HttpApiFsError::Remote {
            cmd: cmd.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that originate on the wire rather than in local validation.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            HttpApiFsError::Remote { .. } | HttpApiFsError::Decode { .. }
        )
    }

    pub fn to_io_kind(&self) -> ErrorKind {
        match self {
            HttpApiFsError::NotFound { .. } => ErrorKind::NotFound,
            HttpApiFsError::InvalidTarget { .. } => ErrorKind::InvalidInput,
            HttpApiFsError::DestinationExists { .. } => ErrorKind::AlreadyExists,
            HttpApiFsError::InvalidPattern { .. } => ErrorKind::InvalidInput,
            HttpApiFsError::Unsupported { .. } => ErrorKind::Unsupported,
            HttpApiFsError::Remote { .. } => ErrorKind::Other,
            HttpApiFsError::Decode { .. } => ErrorKind::InvalidData,
        }
    }
}

impl From<HttpApiFsError> for std::io::Error {
    fn from(err: HttpApiFsError) -> Self {
        std::io::Error::new(err.to_io_kind(), err)
    }
}
