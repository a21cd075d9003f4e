use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to replace catalog file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read or write image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("'{0}' is not a valid image file name")]
    InvalidFilename(String),
}

/// A record key must be a bare file name so it cannot address files outside
/// the image directory.
pub fn validate_filename(filename: &str) -> Result<(), CatalogError> {
    let bad = filename.trim().is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\'])
        || filename.contains('\0');
    if bad {
        Err(CatalogError::InvalidFilename(filename.to_string()))
    } else {
        Ok(())
    }
}
