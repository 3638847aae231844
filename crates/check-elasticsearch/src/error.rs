//! Error types for cluster checks.

use thiserror::Error;

/// Errors that abort a check invocation.
///
/// A 404 on a check endpoint is not an error: checks turn it into an
/// UNKNOWN verdict.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Missing or invalid global configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Missing check-specific argument.
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// Liveness probe against the cluster failed.
    #[error("Error when connecting on Elasticsearch {url}: {reason}")]
    Connection { url: String, reason: String },

    /// A check endpoint returned an error response other than 404.
    #[error("Error when {operation} {target}: {status} - {body}")]
    Remote {
        operation: &'static str,
        target: String,
        status: u16,
        body: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message_has_context() {
        let err = CheckError::Remote {
            operation: "get ILM explain on indice",
            target: "logs-*".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("get ILM explain on indice"));
        assert!(msg.contains("logs-*"));
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }
}
