use std::path::PathBuf;

use crate::catalog::domain::catalog_error::{validate_filename, CatalogError};
use crate::catalog::domain::face_record::{FaceRecord, RecordField};
use crate::catalog::domain::image_store::ImageStore;
use crate::catalog::domain::query_engine::sort_in_place;
use crate::catalog::domain::record_repository::RecordRepository;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted,
    /// A record with the same filename existed and was replaced.
    Replaced,
}

/// Owns the in-memory record collection and keeps it in step with durable
/// storage.
///
/// Every mutation rewrites the whole collection through the repository and
/// only takes effect in memory once that write succeeds.
pub struct RecordStore {
    repository: Box<dyn RecordRepository>,
    images: Box<dyn ImageStore>,
    records: Vec<FaceRecord>,
}

impl RecordStore {
    /// Opens the store and loads whatever the repository holds.
    pub fn open(
        repository: Box<dyn RecordRepository>,
        images: Box<dyn ImageStore>,
    ) -> Result<Self, CatalogError> {
        let records = repository.load()?;
        log::info!("Loaded {} face record(s)", records.len());
        Ok(Self {
            repository,
            images,
            records,
        })
    }

    pub fn records(&self) -> &[FaceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, filename: &str) -> Option<&FaceRecord> {
        self.records.iter().find(|r| r.filename == filename)
    }

    pub fn images(&self) -> &dyn ImageStore {
        self.images.as_ref()
    }

    /// Stored image for a record, if it is still on disk.
    pub fn image_path_for(&self, filename: &str) -> Option<PathBuf> {
        if validate_filename(filename).is_err() || !self.images.contains(filename) {
            return None;
        }
        Some(self.images.path_for(filename))
    }

    /// Adds `record` at the end, replacing any record with the same filename,
    /// then persists the full collection.
    pub fn append(&mut self, record: FaceRecord) -> Result<AppendOutcome, CatalogError> {
        validate_filename(&record.filename)?;

        let mut next: Vec<FaceRecord> = Vec::with_capacity(self.records.len() + 1);
        let mut outcome = AppendOutcome::Inserted;
        for existing in &self.records {
            if existing.filename == record.filename {
                outcome = AppendOutcome::Replaced;
            } else {
                next.push(existing.clone());
            }
        }
        let filename = record.filename.clone();
        next.push(record);

        self.repository.save(&next)?;
        self.records = next;

        match outcome {
            AppendOutcome::Inserted => log::info!("Stored record {filename}"),
            AppendOutcome::Replaced => log::info!("Replaced record {filename}"),
        }
        Ok(outcome)
    }

    /// Removes the record for `filename`, persists, then deletes its image.
    ///
    /// Image removal is best effort: a failure is logged and the record stays
    /// deleted. Returns `false` when no such record exists.
    pub fn delete(&mut self, filename: &str) -> Result<bool, CatalogError> {
        if self.get(filename).is_none() {
            return Ok(false);
        }
        let next: Vec<FaceRecord> = self
            .records
            .iter()
            .filter(|r| r.filename != filename)
            .cloned()
            .collect();

        self.repository.save(&next)?;
        self.records = next;
        log::info!("Deleted record {filename}");

        if let Err(e) = self.images.remove(filename) {
            log::warn!("Could not remove image for {filename}: {e}");
        }
        Ok(true)
    }

    /// Reorders the in-memory collection. The new order is what the next
    /// mutation persists; `reset` discards it.
    pub fn sort_by(&mut self, column: RecordField, ascending: bool) {
        sort_in_place(&mut self.records, column, ascending);
    }

    /// Reloads from durable storage, dropping any in-memory reordering.
    pub fn reset(&mut self) -> Result<&[FaceRecord], CatalogError> {
        self.records = self.repository.load()?;
        log::debug!("Reloaded {} record(s)", self.records.len());
        Ok(&self.records)
    }
}
