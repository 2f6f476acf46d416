use thiserror::Error;

#[derive(Debug, Error)]
pub enum StylistError {
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("The provided API key is not valid. Please check your configuration.")]
    InvalidCredentials,

    #[error("No image found in the model response.")]
    NoImageInResponse,

    #[error("An error occurred while communicating with the AI model: {0}")]
    ProviderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StylistError {
    /// Credential failures need a configuration fix, not a retry.
    pub fn is_credentials(&self) -> bool {
        matches!(self, StylistError::InvalidCredentials)
    }
}

pub type Result<T> = std::result::Result<T, StylistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_message_is_rewritten() {
        let err = StylistError::InvalidCredentials;
        assert!(err.is_credentials());
        assert_eq!(
            err.to_string(),
            "The provided API key is not valid. Please check your configuration."
        );
    }

    #[test]
    fn test_provider_error_wraps_message() {
        let err = StylistError::ProviderError("quota exceeded".into());
        assert!(!err.is_credentials());
        assert!(err.to_string().ends_with("quota exceeded"));
    }
}
