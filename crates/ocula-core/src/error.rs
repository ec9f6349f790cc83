//! Error types for OCULA

use thiserror::Error;

/// Core OCULA errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OculaError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Command errors
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed payload for {command}: expected {expected}, got {found}")]
    MalformedPayload {
        command: String,
        expected: &'static str,
        found: String,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for OculaError {
    fn from(err: std::io::Error) -> Self {
        OculaError::Io(err.to_string())
    }
}

/// Result type for OCULA operations
pub type OculaResult<T> = Result<T, OculaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_message() {
        let err = OculaError::MalformedPayload {
            command: "EnableEyeJitter".to_string(),
            expected: "bool",
            found: "\"maybe\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed payload for EnableEyeJitter: expected bool, got \"maybe\""
        );
    }

    #[test]
    fn test_unknown_command_message() {
        let err = OculaError::UnknownCommand("Unheard".to_string());
        assert_eq!(err.to_string(), "Unknown command: Unheard");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: OculaError = io.into();
        assert!(matches!(err, OculaError::Io(_)));
    }
}
