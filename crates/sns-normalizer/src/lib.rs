pub mod config;
pub mod event;
pub mod metrics;
pub mod parsers;
pub mod router;
pub mod server;
pub mod sns;

pub use event::{Event, EventType, Resource, Severity};
pub use router::{NotificationRouter, Provider};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),
    #[error("Timestamp parse error: {0}")]
    TimestampParse(String),
    #[error("Subscription confirmation failed: {0}")]
    ConfirmationRequest(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_cause() {
        let err = Error::TimestampParse("bad input 'yesterday'".to_string());
        assert_eq!(err.to_string(), "Timestamp parse error: bad input 'yesterday'");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::JsonDecode(_)));
    }
}
