use crate::catalog::domain::catalog_error::CatalogError;
use crate::catalog::domain::face_record::FaceRecord;

/// Durable storage for the whole record collection.
///
/// `save` replaces the stored collection in full; a crash mid-save must leave
/// either the old or the new contents, never a truncated mix.
pub trait RecordRepository: Send {
    fn load(&self) -> Result<Vec<FaceRecord>, CatalogError>;

    fn save(&self, records: &[FaceRecord]) -> Result<(), CatalogError>;
}
