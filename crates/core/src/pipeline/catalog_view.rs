use std::path::PathBuf;

use crate::catalog::domain::face_record::{FaceRecord, RecordField, SearchField};
use crate::catalog::domain::query_engine::{ActiveSort, QueryEngine};
use crate::catalog::domain::record_store::RecordStore;
use crate::pipeline::session_error::SessionError;

/// What a front-end shows of the catalog: the store seen through the current
/// search filter and sort, plus the selected row.
pub struct CatalogView {
    store: RecordStore,
    query: QueryEngine,
    term: String,
    field: SearchField,
    selected: Option<String>,
}

impl CatalogView {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            query: QueryEngine::new(),
            term: String::new(),
            field: SearchField::All,
            selected: None,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// Records matching the current search, in the store's current order.
    pub fn visible(&self) -> Vec<FaceRecord> {
        QueryEngine::search(self.store.records(), &self.term, self.field)
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn search_field(&self) -> SearchField {
        self.field
    }

    pub fn set_search(&mut self, term: impl Into<String>, field: SearchField) {
        self.term = term.into();
        self.field = field;
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new(), SearchField::All);
    }

    pub fn active_sort(&self) -> Option<ActiveSort> {
        self.query.active_sort()
    }

    /// Sorts the whole collection by `column`, toggling direction on repeated
    /// requests. The search filter stays applied.
    pub fn sort(&mut self, column: RecordField) -> ActiveSort {
        let active = self.query.request_sort(column);
        self.store.sort_by(active.column, active.ascending);
        active
    }

    /// Reloads from disk and drops sort, search, and selection.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.store.reset()?;
        self.query.reset();
        self.clear_search();
        self.selected = None;
        Ok(())
    }

    /// Selects a row and returns its stored image, if still on disk.
    pub fn select(&mut self, filename: &str) -> Result<Option<PathBuf>, SessionError> {
        if self.store.get(filename).is_none() {
            return Err(SessionError::UnknownRecord(filename.to_string()));
        }
        self.selected = Some(filename.to_string());
        Ok(self.store.image_path_for(filename))
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Deletes the selected record and its image.
    pub fn delete_selected(&mut self) -> Result<String, SessionError> {
        let filename = self.selected.clone().ok_or(SessionError::NoEntrySelected)?;
        self.delete(&filename)?;
        Ok(filename)
    }

    pub fn delete(&mut self, filename: &str) -> Result<(), SessionError> {
        if !self.store.delete(filename)? {
            return Err(SessionError::UnknownRecord(filename.to_string()));
        }
        if self.selected.as_deref() == Some(filename) {
            self.selected = None;
        }
        Ok(())
    }
}
