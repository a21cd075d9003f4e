use std::path::Path;

use crate::analysis::domain::age_bucketer::AgeBucketer;
use crate::analysis::domain::face_analysis::FaceAttributes;
use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::capture::infrastructure::image_file_reader::{has_extension, read_frame};
use crate::catalog::domain::face_record::FaceRecord;
use crate::catalog::domain::record_store::RecordStore;
use crate::pipeline::session_error::SessionError;
use crate::shared::constants::UPLOAD_EXTENSIONS;

/// Single-image pipeline: read → analyze → (optionally) import and store.
///
/// Unlike the live loop, analyzer failures here are returned to the caller
/// and nothing is stored.
pub struct AnalyzeImageUseCase {
    analyzer: Box<dyn FaceAnalyzer>,
    bucketer: AgeBucketer,
}

impl AnalyzeImageUseCase {
    pub fn new(analyzer: Box<dyn FaceAnalyzer>, bucketer: AgeBucketer) -> Self {
        Self { analyzer, bucketer }
    }

    /// Attributes of the first face in `image`, sentinel-filled if the
    /// analyzer found none.
    pub fn analyze(&mut self, image: Option<&Path>) -> Result<FaceAttributes, SessionError> {
        let path = selected_image(image)?;
        let frame = read_frame(path, 0)?;
        let results = self
            .analyzer
            .analyze(&frame)
            .map_err(|e| SessionError::Analysis(e.to_string()))?;
        log::debug!("{} face(s) in {}", results.len(), path.display());
        Ok(FaceAttributes::from_first(&results, &self.bucketer))
    }

    /// Analyzes `image`, copies it into the image store under its base name,
    /// and appends a record for it. A record with the same name is replaced.
    ///
    /// If the record cannot be persisted, a newly imported image is removed
    /// again. An image that was already stored under that name stays
    /// overwritten with the new content.
    pub fn save(
        &mut self,
        image: Option<&Path>,
        store: &mut RecordStore,
    ) -> Result<FaceRecord, SessionError> {
        let attributes = self.analyze(image)?;
        let path = selected_image(image)?;

        let preexisting = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| store.images().contains(name));
        let filename = store.images().import(path)?;

        let record = FaceRecord::new(filename.as_str(), attributes);
        if let Err(e) = store.append(record.clone()) {
            if preexisting {
                log::warn!("Stored image {filename} was overwritten but its record was not updated");
            } else if let Err(cleanup) = store.images().remove(&filename) {
                log::warn!("Could not remove orphaned import {filename}: {cleanup}");
            }
            return Err(e.into());
        }
        Ok(record)
    }
}

fn selected_image(image: Option<&Path>) -> Result<&Path, SessionError> {
    let path = image.ok_or(SessionError::NoImageSelected)?;
    if !has_extension(path, UPLOAD_EXTENSIONS) {
        return Err(SessionError::UnsupportedImage(path.to_path_buf()));
    }
    Ok(path)
}
