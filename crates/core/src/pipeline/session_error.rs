use std::path::PathBuf;

use thiserror::Error;

use crate::capture::domain::capture_error::CaptureError;
use crate::catalog::domain::catalog_error::CatalogError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no frame available to capture")]
    NoFrame,
    #[error("no image selected")]
    NoImageSelected,
    #[error("no entry selected")]
    NoEntrySelected,
    #[error("no record named {0}")]
    UnknownRecord(String),
    #[error("unsupported image type: {0} (expected .jpg, .jpeg or .png)")]
    UnsupportedImage(PathBuf),
    #[error("analysis failed: {0}")]
    Analysis(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl SessionError {
    /// Operator mistakes that change nothing and can simply be corrected.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SessionError::NoFrame
                | SessionError::NoImageSelected
                | SessionError::NoEntrySelected
                | SessionError::UnknownRecord(_)
                | SessionError::UnsupportedImage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_classification() {
        assert!(SessionError::NoFrame.is_warning());
        assert!(SessionError::NoEntrySelected.is_warning());
        assert!(!SessionError::Analysis("boom".to_string()).is_warning());
        assert!(!SessionError::Capture(CaptureError::DeviceUnavailable("cam0".to_string())).is_warning());
    }

    #[test]
    fn test_messages() {
        assert_eq!(SessionError::NoFrame.to_string(), "no frame available to capture");
        assert_eq!(
            SessionError::Analysis("timeout".to_string()).to_string(),
            "analysis failed: timeout"
        );
    }
}
