use std::path::PathBuf;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Transport error: {0}")]
    Transport(String),

    /// Failure reported by the backend; the message is shown to the user as-is.
    #[error("{0}")]
    BackendError(String),

    #[error(transparent)]
    Core(#[from] ao_core::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => Self::AuthRequired,
            _ => Self::Transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_unchanged() {
        let err = AppError::BackendError("Daily generation limit reached".into());
        assert_eq!(err.to_string(), "Daily generation limit reached");
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err = AppError::from(ao_core::Error::EmptyDraft);
        assert_eq!(err.to_string(), ao_core::Error::EmptyDraft.to_string());
        assert!(matches!(err, AppError::Core(ao_core::Error::EmptyDraft)));
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = AppError::Io {
            path: PathBuf::from("/tmp/missing.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/tmp/missing.png"));
    }
}
