/// Unified error types for the RSVP board
use thiserror::Error;

/// Main error type for board operations
#[derive(Error, Debug)]
pub enum RsvpError {
    /// Login submitted without choosing a participant
    #[error("Please select your name")]
    NoIdentitySelected,

    /// Identity is not part of the roster
    #[error("Unknown participant: {0}")]
    UnknownIdentity(String),

    /// Credential did not match the roster entry
    #[error("Wrong password!")]
    WrongCredential,

    /// Operation requires an active session
    #[error("Not logged in")]
    NotLoggedIn,

    /// Admin-only operation attempted by a regular participant
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Session is not allowed to manage a custom avatar
    #[error("Custom images are not enabled for {0}")]
    UploadNotPermitted(String),

    /// Upload rejected because of its size
    #[error("Image too large! Please use an image under {limit} bytes (got {size})")]
    ImageTooLarge { size: usize, limit: usize },

    /// Upload payload is not an image we can render
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Configuration errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account directory could not be loaded
    #[error("Roster error: {0}")]
    Roster(String),

    /// Key/value backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RsvpError {
    /// Whether the message is meant to be shown to the participant.
    ///
    /// Everything else is operational and gets logged instead.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            RsvpError::NoIdentitySelected
                | RsvpError::UnknownIdentity(_)
                | RsvpError::WrongCredential
                | RsvpError::NotLoggedIn
                | RsvpError::PermissionDenied(_)
                | RsvpError::UploadNotPermitted(_)
                | RsvpError::ImageTooLarge { .. }
                | RsvpError::UnsupportedImage(_)
        )
    }
}

/// Result type alias for board operations
pub type RsvpResult<T> = Result<T, RsvpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_errors_are_user_facing() {
        assert!(RsvpError::NoIdentitySelected.is_user_facing());
        assert!(RsvpError::WrongCredential.is_user_facing());
        assert!(RsvpError::ImageTooLarge { size: 3, limit: 2 }.is_user_facing());
    }

    #[test]
    fn test_storage_errors_are_internal() {
        assert!(!RsvpError::Storage("disk full".to_string()).is_user_facing());
        assert!(!RsvpError::Validation("bad".to_string()).is_user_facing());
    }

    #[test]
    fn test_wrong_credential_message() {
        assert_eq!(RsvpError::WrongCredential.to_string(), "Wrong password!");
    }
}
