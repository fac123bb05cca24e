//! Error types for linkscout

use thiserror::Error;

/// Result type alias for linkscout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for linkscout
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TLV or TLV sub-structure does not fit in the remaining bytes
    #[error("Malformed TLV at offset {offset}: {reason}")]
    MalformedTlv { offset: usize, reason: String },

    /// Frame is not a discovery frame, or its header could not be located
    #[error("Unrecognized frame: {0}")]
    UnrecognizedFrame(String),

    /// Capture primitive failure (open, filter, read)
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Insufficient privileges to open a capture
    #[error("Insufficient privileges: {0}")]
    InsufficientPrivileges(String),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Value could not be parsed
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),
}

impl Error {
    /// Create a malformed TLV error
    pub fn malformed<S: Into<String>>(offset: usize, reason: S) -> Self {
        Error::MalformedTlv {
            offset,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = Error::malformed(18, "length 40 exceeds 12 remaining bytes");
        assert_eq!(
            err.to_string(),
            "Malformed TLV at offset 18: length 40 exceeds 12 remaining bytes"
        );
    }
}
