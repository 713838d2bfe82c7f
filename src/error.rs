//! Error types for dashboard rendering and snapshot export

use thiserror::Error;

/// Result type alias for dashsnap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing, rendering or exporting a dashboard
#[derive(Error, Debug)]
pub enum Error {
    /// The container handle did not resolve to a rendered element
    #[error("Target not found: no rendered element with id '{0}'")]
    TargetNotFound(String),

    /// Pixel data could not be read back from the raster buffer
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// The surface did not finish the capture in time
    #[error("Capture timed out after {0}ms")]
    CaptureTimeout(u64),

    /// The raster buffer could not be encoded as PNG
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// The host save mechanism rejected the blob
    #[error("Saving '{file_name}' failed: {source}")]
    SaveError {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration or dashboard definition
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to lay out or paint content
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short machine-friendly name of the error kind, used in user notices.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::TargetNotFound(_) => "TargetNotFound",
            Error::CaptureFailed(_) => "CaptureFailed",
            Error::CaptureTimeout(_) => "CaptureTimeout",
            Error::EncodeError(_) => "EncodeError",
            Error::SaveError { .. } => "SaveError",
            Error::ConfigError(_) => "ConfigError",
            Error::RenderError(_) => "RenderError",
            Error::Other(_) => "Other",
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::EncodeError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(Error::TargetNotFound("x".into()).kind(), "TargetNotFound");
        assert_eq!(Error::CaptureTimeout(5).kind(), "CaptureTimeout");
        assert_eq!(
            Error::CaptureTimeout(250).to_string(),
            "Capture timed out after 250ms"
        );
    }
}
