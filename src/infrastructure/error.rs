use thiserror::Error;

/// Marker the backend prefixes onto messages meant for the user verbatim,
/// e.g. the group-skipping rejection. Anything else surfaces as a generic
/// failure message.
pub const USER_WARNING_MARKER: &str = "⚠️";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Backend(String),
}

impl AppError {
    /// The backend message when it is meant to be shown to the user as-is.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Backend(message) if message.contains(USER_WARNING_MARKER) => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_backend_errors_surface_verbatim() {
        let error = AppError::Backend("⚠️ No puedes saltar grupos".to_string());
        assert_eq!(error.user_message(), Some("⚠️ No puedes saltar grupos"));
    }

    #[test]
    fn unmarked_errors_stay_generic() {
        assert!(AppError::Backend("UNIQUE constraint failed".to_string())
            .user_message()
            .is_none());
        assert!(AppError::InvalidInput("person.name must not be empty".to_string())
            .user_message()
            .is_none());
    }
}
