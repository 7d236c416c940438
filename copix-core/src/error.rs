/// Structured error types for copix-core.
///
/// Uses `thiserror` so the session binary can match on the kind and decide
/// what to show the user. The binary itself wraps these in `anyhow` where it
/// only needs to report.
use thiserror::Error;

use crate::model::NameId;

/// Main error type for copix-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CopixError {
    /// Name was empty or only whitespace
    #[error("Please enter a valid name")]
    InvalidInput,

    /// Operation referenced an id that is not in the list
    #[error("No entry with id {id}")]
    NotFound { id: NameId },

    /// The user refused access to their photos
    #[error("Permission needed: please grant access to your photos")]
    PermissionDenied,

    /// Platform clipboard could not be written
    #[error("Clipboard unavailable: {reason}")]
    ClipboardUnavailable { reason: String },

    /// An image picker call is already pending for this workflow
    #[error("An image selection is already in progress")]
    ImagePickInFlight,

    /// Command is not valid in the current workflow state
    #[error("Cannot {action} while {state}")]
    Workflow {
        action: &'static str,
        state: &'static str,
    },

    /// User pressed Ctrl-C inside a platform prompt; ends the session
    #[error("Interrupted")]
    Interrupted,

    /// Image service failed for a reason other than denial or cancellation
    #[error("Image service error: {reason}")]
    ImageService { reason: String },
}

/// Result type alias for copix-core operations
pub type Result<T> = std::result::Result<T, CopixError>;

impl CopixError {
    /// Create a not-found error for an id
    pub fn not_found(id: NameId) -> Self {
        Self::NotFound { id }
    }

    /// Create a clipboard error
    pub fn clipboard(reason: impl Into<String>) -> Self {
        Self::ClipboardUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an illegal-transition error
    pub fn workflow(action: &'static str, state: &'static str) -> Self {
        Self::Workflow { action, state }
    }

    /// Create an image service error
    pub fn image_service(reason: impl Into<String>) -> Self {
        Self::ImageService {
            reason: reason.into(),
        }
    }

    /// Stale ids are expected when the view lags behind a removal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CopixError::workflow("attach an image", "idle");
        assert_eq!(err.to_string(), "Cannot attach an image while idle");

        let err = CopixError::clipboard("no display");
        assert!(err.to_string().contains("Clipboard unavailable"));
        assert!(err.to_string().contains("no display"));
    }

    #[test]
    fn test_not_found_carries_id() {
        let id = NameId::new();
        let err = CopixError::not_found(id);

        assert!(err.is_not_found());
        assert!(err.to_string().contains(&id.to_string()));
        assert!(!CopixError::Interrupted.is_not_found());
    }
}
