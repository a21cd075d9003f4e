use crate::catalog::domain::face_record::{FaceRecord, RecordField, SearchField};

/// The column and direction of the sort currently applied to a catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveSort {
    pub column: RecordField,
    pub ascending: bool,
}

/// Search and sort over record snapshots, plus the header-click sort toggle.
///
/// Sort state moves `none → ascending(col) → descending(col) → ascending(col)`
/// on repeated requests for the same column; a different column always
/// starts ascending, and `reset` clears it.
#[derive(Debug, Default)]
pub struct QueryEngine {
    active: Option<ActiveSort>,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_sort(&self) -> Option<ActiveSort> {
        self.active
    }

    /// Advances the toggle for a sort request on `column`.
    pub fn request_sort(&mut self, column: RecordField) -> ActiveSort {
        let next = match self.active {
            Some(current) if current.column == column => ActiveSort {
                column,
                ascending: !current.ascending,
            },
            _ => ActiveSort {
                column,
                ascending: true,
            },
        };
        self.active = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Rows where the lowercased `term` is a substring of the chosen cell(s).
    ///
    /// An empty term matches everything.
    pub fn search(records: &[FaceRecord], term: &str, field: SearchField) -> Vec<FaceRecord> {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|record| matches(record, &needle, field))
            .cloned()
            .collect()
    }

    /// Stable sort by the column's string value.
    ///
    /// Rows with equal keys keep their relative order in both directions.
    pub fn sort(records: &[FaceRecord], column: RecordField, ascending: bool) -> Vec<FaceRecord> {
        let mut sorted = records.to_vec();
        sort_in_place(&mut sorted, column, ascending);
        sorted
    }
}

pub fn sort_in_place(records: &mut [FaceRecord], column: RecordField, ascending: bool) {
    records.sort_by(|a, b| {
        let ord = a.field(column).cmp(b.field(column));
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

fn matches(record: &FaceRecord, needle: &str, field: SearchField) -> bool {
    let contains = |f: RecordField| record.field(f).to_lowercase().contains(needle);
    match field {
        SearchField::All => RecordField::ALL.into_iter().any(contains),
        SearchField::Only(f) => contains(f),
    }
}
