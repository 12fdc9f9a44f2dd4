use std::path::PathBuf;
use thiserror::Error;

/// Failures a tool can end with.
///
/// Network and HTTP status errors are ordinary outcomes of a fetch and are
/// reported back as text. Storage errors are faults: the call is aborted and
/// flagged as failed at the protocol edge.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Carries no request URL, which would include the API key.
    #[error("{0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("storage error on {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode articles: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl ToolError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// True for local storage failures, which are not part of a tool's
    /// textual contract.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Corrupt { .. } | Self::Encode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(ToolError::storage("/tmp/notes.txt", io).is_fault());

        let status = ToolError::HttpStatus {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: "Your API key is invalid".to_string(),
        };
        assert!(!status.is_fault());
        assert_eq!(status.to_string(), "HTTP 401 Unauthorized: Your API key is invalid");
    }

    #[test]
    fn test_corrupt_store_message_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ToolError::Corrupt {
            path: PathBuf::from("/data/news_articles.json"),
            source,
        };
        assert!(err.is_fault());
        assert!(err.to_string().starts_with("corrupt store /data/news_articles.json:"));
    }
}
