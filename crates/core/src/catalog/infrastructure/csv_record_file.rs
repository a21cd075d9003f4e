use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::analysis::domain::age_bucketer::is_valid_age_range;
use crate::catalog::domain::catalog_error::CatalogError;
use crate::catalog::domain::face_record::{FaceRecord, RecordField};
use crate::catalog::domain::record_repository::RecordRepository;

/// Stores the catalog as a CSV file with a fixed five-column header.
///
/// Every save writes a sibling temp file and renames it over the target,
/// so readers never observe a half-written catalog.
pub struct CsvRecordFile {
    path: PathBuf,
}

impl CsvRecordFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CatalogError {
        CatalogError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> CatalogError {
        CatalogError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn is_missing_or_empty(&self) -> Result<bool, CatalogError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

impl RecordRepository for CsvRecordFile {
    fn load(&self) -> Result<Vec<FaceRecord>, CatalogError> {
        if self.is_missing_or_empty()? {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let mut rows = Vec::new();
        for (line, row) in reader.deserialize::<FaceRecord>().enumerate() {
            let record = row.map_err(|e| self.csv_error(e))?;
            if record.filename.trim().is_empty() {
                log::warn!(
                    "Skipping row {} of {}: empty filename",
                    line + 2,
                    self.path.display()
                );
                continue;
            }
            let record = record.with_sentinels();
            if !is_valid_age_range(&record.age_range) {
                log::warn!(
                    "Row {} of {}: unexpected age range '{}'",
                    line + 2,
                    self.path.display(),
                    record.age_range
                );
            }
            rows.push(record);
        }

        Ok(collapse_duplicates(rows, &self.path))
    }

    fn save(&self, records: &[FaceRecord]) -> Result<(), CatalogError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut temp);
            writer
                .write_record(RecordField::ALL.map(RecordField::column_name))
                .map_err(|e| self.csv_error(e))?;
            for record in records {
                writer.serialize(record).map_err(|e| self.csv_error(e))?;
            }
            writer.flush().map_err(|e| self.io_error(e))?;
        }
        temp.flush().map_err(|e| self.io_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.io_error(e))?;

        temp.persist(&self.path)
            .map_err(|e| CatalogError::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;
        log::debug!("Wrote {} record(s) to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Keeps the last row for each filename, at that row's position.
fn collapse_duplicates(rows: Vec<FaceRecord>, path: &Path) -> Vec<FaceRecord> {
    let mut seen = HashSet::new();
    let mut kept: Vec<FaceRecord> = Vec::with_capacity(rows.len());
    for record in rows.into_iter().rev() {
        if seen.insert(record.filename.clone()) {
            kept.push(record);
        } else {
            log::warn!(
                "Duplicate row for {} in {}; keeping the latest",
                record.filename,
                path.display()
            );
        }
    }
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(filename: &str, gender: &str) -> FaceRecord {
        FaceRecord {
            filename: filename.to_string(),
            gender: gender.to_string(),
            age_range: "20-25".to_string(),
            emotion: "happy".to_string(),
            race: "asian".to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = CsvRecordFile::new(dir.path().join("face_data.csv"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        fs::write(&path, "").unwrap();
        assert!(CsvRecordFile::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        let file = CsvRecordFile::new(&path);
        file.save(&[rec("a.jpg", "Man")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("filename,gender,age_range,emotion,race"));
        assert_eq!(lines.next(), Some("a.jpg,Man,20-25,happy,asian"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_collection_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        CsvRecordFile::new(&path).save(&[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim_end(),
            "filename,gender,age_range,emotion,race"
        );
    }

    #[test]
    fn test_save_then_load_reproduces_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = CsvRecordFile::new(dir.path().join("face_data.csv"));
        let records = vec![
            rec("a.jpg", "Man"),
            rec("b, with comma.jpg", "Woman"),
            rec("c \"quoted\".png", "-"),
        ];
        file.save(&records).unwrap();
        assert_eq!(file.load().unwrap(), records);
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let file = CsvRecordFile::new(dir.path().join("face_data.csv"));
        file.save(&[rec("a.jpg", "Man"), rec("b.jpg", "Man")]).unwrap();
        file.save(&[rec("c.jpg", "Woman")]).unwrap();
        assert_eq!(file.load().unwrap(), vec![rec("c.jpg", "Woman")]);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = CsvRecordFile::new(dir.path().join("face_data.csv"));
        file.save(&[rec("a.jpg", "Man")]).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = CsvRecordFile::new(dir.path().join("nested").join("face_data.csv"));
        file.save(&[rec("a.jpg", "Man")]).unwrap();
        assert_eq!(file.load().unwrap().len(), 1);
    }

    #[test]
    fn test_blank_cells_load_as_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        fs::write(
            &path,
            "filename,gender,age_range,emotion,race\na.jpg,,,,\n",
        )
        .unwrap();
        let records = CsvRecordFile::new(path).load().unwrap();
        assert_eq!(records[0].gender, "-");
        assert_eq!(records[0].age_range, "Unknown");
        assert_eq!(records[0].race, "-");
    }

    #[test]
    fn test_rows_without_filename_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        fs::write(
            &path,
            "filename,gender,age_range,emotion,race\n,Man,0-5,sad,-\nb.jpg,Man,0-5,sad,-\n",
        )
        .unwrap();
        let records = CsvRecordFile::new(path).load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "b.jpg");
    }

    #[test]
    fn test_legacy_duplicate_rows_collapse_to_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        fs::write(
            &path,
            "filename,gender,age_range,emotion,race\n\
             a.jpg,Man,20-25,happy,asian\n\
             b.jpg,Woman,30-35,sad,white\n\
             a.jpg,Man,45-50,angry,asian\n",
        )
        .unwrap();
        let records = CsvRecordFile::new(path).load().unwrap();
        let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["b.jpg", "a.jpg"]);
        assert_eq!(records[1].age_range, "45-50");
    }

    #[test]
    fn test_columns_may_appear_in_any_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        fs::write(
            &path,
            "race,emotion,age_range,gender,filename\nasian,happy,20-25,Man,a.jpg\n",
        )
        .unwrap();
        let records = CsvRecordFile::new(path).load().unwrap();
        assert_eq!(records, vec![rec("a.jpg", "Man")]);
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face_data.csv");
        fs::write(&path, "filename,gender\na.jpg,Man\n").unwrap();
        assert!(matches!(
            CsvRecordFile::new(path).load(),
            Err(CatalogError::Csv { .. })
        ));
    }
}
