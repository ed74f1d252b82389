//! Error types for the strip_risk library

use thiserror::Error;

/// Result type alias for strip_risk operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for strip classification
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Malformed or empty region data
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Calibration was required but none is available
    #[error("Uncalibrated reference colors: {reason}")]
    UnderCalibrated { reason: String },

    /// Image file or data URL could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// Under-calibrated results can be retried with calibration data; every
    /// other error needs different input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::UnderCalibrated { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidInput { .. } => {
                "The selected strip area is empty. Please move the corners over the strip and try again.".to_string()
            }
            AnalysisError::UnderCalibrated { .. } => {
                "No color calibration is available. Include the reference card in the photo for a reliable result.".to_string()
            }
            AnalysisError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            AnalysisError::ConfigError { .. } => {
                "The analysis settings could not be read.".to_string()
            }
        }
    }
}
