use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::catalog::domain::catalog_error::{validate_filename, CatalogError};
use crate::catalog::domain::image_store::ImageStore;
use crate::shared::frame::Frame;

/// Image files stored flat in a single directory, created on open.
pub struct ImageDirectory {
    root: PathBuf,
}

impl ImageDirectory {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| CatalogError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn already_stored(&self, source: &Path, destination: &Path) -> bool {
        match (fs::canonicalize(source), fs::canonicalize(destination)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl ImageStore for ImageDirectory {
    fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    fn import(&self, source: &Path) -> Result<String, CatalogError> {
        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CatalogError::InvalidFilename(source.display().to_string()))?
            .to_string();
        validate_filename(&filename)?;

        let destination = self.path_for(&filename);
        if self.already_stored(source, &destination) {
            return Ok(filename);
        }

        // Re-encoded, so the store only holds decodable images.
        let image = image::open(source).map_err(|e| CatalogError::Image {
            path: source.to_path_buf(),
            source: e,
        })?;
        image.save(&destination).map_err(|e| CatalogError::Image {
            path: destination.clone(),
            source: e,
        })?;
        log::debug!("Imported {} as {}", source.display(), destination.display());
        Ok(filename)
    }

    fn write_frame(&self, filename: &str, frame: &Frame) -> Result<(), CatalogError> {
        validate_filename(filename)?;
        let destination = self.path_for(filename);
        DynamicImage::ImageRgb8(frame.to_rgb_image())
            .save(&destination)
            .map_err(|e| CatalogError::Image {
                path: destination,
                source: e,
            })
    }

    fn remove(&self, filename: &str) -> Result<(), CatalogError> {
        validate_filename(filename)?;
        let path = self.path_for(filename);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CatalogError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::filled(16, 12, [30, 60, 90], 0)
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("captured_faces");
        let store = ImageDirectory::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[test]
    fn test_write_frame_then_contains() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path()).unwrap();
        store.write_frame("face_1.png", &frame()).unwrap();
        assert!(store.contains("face_1.png"));

        let img = image::open(store.path_for("face_1.png")).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 12));
        assert_eq!(img.get_pixel(0, 0).0, [30, 60, 90]);
    }

    #[test]
    fn test_write_frame_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path()).unwrap();
        store.write_frame("face_1.jpg", &frame()).unwrap();
        assert!(image::open(store.path_for("face_1.jpg")).is_ok());
    }

    #[test]
    fn test_import_copies_under_basename() {
        let src_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("upload.png");
        frame().to_rgb_image().save(&source).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path().join("faces")).unwrap();
        let name = store.import(&source).unwrap();

        assert_eq!(name, "upload.png");
        assert!(store.contains("upload.png"));
        assert!(source.exists());
    }

    #[test]
    fn test_import_of_stored_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path()).unwrap();
        store.write_frame("face.png", &frame()).unwrap();
        let name = store.import(&store.path_for("face.png")).unwrap();
        assert_eq!(name, "face.png");
    }

    #[test]
    fn test_import_rejects_non_image() {
        let src_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("notes.png");
        fs::write(&source, b"hello").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path().join("faces")).unwrap();
        assert!(matches!(store.import(&source), Err(CatalogError::Image { .. })));
        assert!(!store.contains("notes.png"));
    }

    #[test]
    fn test_remove_deletes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path()).unwrap();
        store.write_frame("a.png", &frame()).unwrap();
        store.remove("a.png").unwrap();
        assert!(!store.contains("a.png"));
        store.remove("a.png").unwrap();
    }

    #[test]
    fn test_remove_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageDirectory::open(dir.path().join("faces")).unwrap();
        assert!(matches!(
            store.remove("../face_data.csv"),
            Err(CatalogError::InvalidFilename(_))
        ));
    }
}
