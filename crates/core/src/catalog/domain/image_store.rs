use std::path::{Path, PathBuf};

use crate::catalog::domain::catalog_error::CatalogError;
use crate::shared::frame::Frame;

/// The directory of image files backing catalog records, one per filename.
pub trait ImageStore: Send {
    fn path_for(&self, filename: &str) -> PathBuf;

    fn contains(&self, filename: &str) -> bool {
        self.path_for(filename).is_file()
    }

    /// Copies an external image in under its base name, unless it already
    /// lives in the store. Returns the stored file name.
    fn import(&self, source: &Path) -> Result<String, CatalogError>;

    fn write_frame(&self, filename: &str, frame: &Frame) -> Result<(), CatalogError>;

    fn remove(&self, filename: &str) -> Result<(), CatalogError>;
}
