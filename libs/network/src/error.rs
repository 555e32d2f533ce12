//! Transport Error Types
//!
//! Error handling for the publish exchange with the network coordinator:
//! coordinator-reported failures, malformed replies, lost coordinators,
//! timeouts and configuration problems.

use thiserror::Error;

/// Main transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// The coordinator refused the request; `message` is its text verbatim
    #[error("{message}")]
    Publish { message: String },

    /// The coordinator answered with a reply of unexpected shape
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// The coordinator mailbox is closed or the reply was dropped
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// No reply arrived within the configured bound
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Generic I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create a publish failure carrying the coordinator's text
    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish {
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Check whether the caller may reasonably issue the request again
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::Publish { .. } => true,
            TransportError::Timeout { .. } => true,
            TransportError::Io { .. } => true,
            TransportError::Connection { .. } => false,
            TransportError::Protocol { .. } => false,
            TransportError::Configuration { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Publish { .. } => "publish",
            TransportError::Protocol { .. } => "protocol",
            TransportError::Connection { .. } => "connection",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Configuration { .. } => "configuration",
            TransportError::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<types::TupleError> for TransportError {
    fn from(err: types::TupleError) -> Self {
        Self::protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_message_is_verbatim() {
        let err = TransportError::publish("address already in use");
        assert_eq!(err.to_string(), "address already in use");
        assert_eq!(err.category(), "publish");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_timeout_display() {
        let err = TransportError::timeout("publish", 250);
        assert_eq!(err.to_string(), "Timeout error: publish exceeded 250ms");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unrecoverable_classes() {
        assert!(!TransportError::protocol("bad reply").is_recoverable());
        assert!(!TransportError::connection("middleman gone").is_recoverable());
        assert!(!TransportError::configuration("zero capacity", Some("mailbox_capacity"))
            .is_recoverable());
    }

    #[test]
    fn test_connection_display() {
        let err = TransportError::connection("Middleman mailbox is closed");
        assert_eq!(err.to_string(), "Connection error: Middleman mailbox is closed");
        assert_eq!(err.category(), "connection");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address already in use");
        let err: TransportError = io.into();
        assert!(matches!(err, TransportError::Io { .. }));
        assert_eq!(err.to_string(), "I/O error: address already in use");
    }

    #[test]
    fn test_from_tuple_error() {
        let err: TransportError = types::TupleError::index_out_of_range(2, 1).into();
        assert!(matches!(err, TransportError::Protocol { .. }));
    }
}
