use crate::{client::is_retryable_status, Document};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum IseError {
    /// Connection could not be established or timed out before a response.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Response was received but its body could not be read.
    #[error("cannot read response body: {0}")]
    Read(reqwest::Error),
    /// Non-success HTTP status code with the best-effort server message.
    #[error("HTTP Request failed: StatusCode {status}, Message: {message}")]
    Http {
        status: u16,
        /// First message title reported by ISE, empty when absent.
        message: String,
        /// Response body as returned by the server.
        document: Box<Document>,
    },
    /// The underlying HTTP client could not be built.
    #[error("cannot build http client: {0}")]
    Build(reqwest::Error),
    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl IseError {
    /// Returns the server document that accompanied the failure, if any.
    ///
    /// Transport and read failures never received a usable body.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Http { document, .. } => Some(document.as_ref()),
            _ => None,
        }
    }

    /// Returns the HTTP status code for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure belongs to a class the client retries.
    ///
    /// When this error reaches the caller of a verb, the retry budget for
    /// that class has already been spent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Read(_) => true,
            Self::Http { status, .. } => is_retryable_status(*status),
            Self::Build(_) | Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, IseError};

    fn http_error(status: u16) -> IseError {
        IseError::Http {
            status,
            message: "Resource not found".to_owned(),
            document: Box::new(Document::parse(b"{}")),
        }
    }

    #[test]
    fn http_error_message_matches_ers_format() {
        assert_eq!(
            http_error(404).to_string(),
            "HTTP Request failed: StatusCode 404, Message: Resource not found"
        );
    }

    #[test]
    fn retryable_classification_follows_status() {
        assert!(http_error(503).is_retryable());
        assert!(http_error(408).is_retryable());
        assert!(!http_error(500).is_retryable());
        assert!(!http_error(405).is_retryable());
        assert!(!IseError::Config("x".to_owned()).is_retryable());
    }

    #[test]
    fn document_is_only_attached_to_status_errors() {
        assert!(http_error(400).document().is_some());
        assert_eq!(http_error(400).status(), Some(400));
        assert!(IseError::Config("x".to_owned()).document().is_none());
    }
}
