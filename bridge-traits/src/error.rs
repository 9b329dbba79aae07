use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Rejection reported by a remote backend. Rendered verbatim so the
    /// reason can be forwarded to the host untouched.
    #[error("{0}")]
    Backend(String),

    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand for a backend rejection carrying `reason`.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_reason_is_verbatim() {
        let error = BridgeError::backend("invalid password");
        assert_eq!(error.to_string(), "invalid password");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.bin");
        let error: BridgeError = io.into();
        assert!(matches!(error, BridgeError::Io(_)));
        assert!(error.to_string().contains("missing.bin"));
    }
}
