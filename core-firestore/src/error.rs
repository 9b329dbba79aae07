use thiserror::Error;

/// Failures reported on `firestore_failure`. The rendered message is the
/// reason text the host receives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FirestoreError {
    #[error("Firestore {operation}: {reason}")]
    Backend {
        operation: &'static str,
        reason: String,
    },

    #[error("Document does not exist")]
    NotFound,
}

impl FirestoreError {
    pub fn backend(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FirestoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_texts() {
        assert_eq!(
            FirestoreError::backend("setDocument", "PERMISSION_DENIED").to_string(),
            "Firestore setDocument: PERMISSION_DENIED"
        );
        assert_eq!(FirestoreError::NotFound.to_string(), "Document does not exist");
    }
}
