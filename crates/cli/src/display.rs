use face_catalog_core::analysis::domain::face_analysis::FaceAttributes;
use face_catalog_core::catalog::domain::face_record::{FaceRecord, RecordField};
use face_catalog_core::catalog::domain::query_engine::ActiveSort;

/// Renders records as a left-aligned text table with a title row.
pub fn format_table(records: &[FaceRecord]) -> String {
    let mut widths: Vec<usize> = RecordField::ALL.iter().map(|f| f.title().len()).collect();
    for record in records {
        for (width, field) in widths.iter_mut().zip(RecordField::ALL) {
            *width = (*width).max(record.field(field).chars().count());
        }
    }

    let mut lines = vec![format_row(
        &RecordField::ALL.map(RecordField::title),
        &widths,
    )];
    for record in records {
        lines.push(format_row(&RecordField::ALL.map(|f| record.field(f)), &widths));
    }
    lines.push(match records.len() {
        1 => "(1 record)".to_string(),
        n => format!("({n} records)"),
    });
    lines.join("\n")
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn format_attributes(attributes: &FaceAttributes) -> String {
    attributes.display_lines().join("\n")
}

pub fn format_sort(sort: ActiveSort) -> String {
    let direction = if sort.ascending { "ascending" } else { "descending" };
    format!("Sorted by {} ({direction})", sort.column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, gender: &str) -> FaceRecord {
        FaceRecord::new(
            filename,
            FaceAttributes {
                gender: gender.to_string(),
                age_range: "20-25".to_string(),
                emotion: "happy".to_string(),
                race: "asian".to_string(),
            },
        )
    }

    #[test]
    fn test_table_aligns_columns() {
        let table = format_table(&[record("long_name.jpg", "Man"), record("b.jpg", "Woman")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Filename       Gender  Age Range  Emotion  Race");
        assert_eq!(lines[1], "long_name.jpg  Man     20-25      happy    asian");
        assert_eq!(lines[2], "b.jpg          Woman   20-25      happy    asian");
        assert_eq!(lines[3], "(2 records)");
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = format_table(&[]);
        assert_eq!(table, "Filename  Gender  Age Range  Emotion  Race\n(0 records)");
    }

    #[test]
    fn test_format_attributes_uses_labels() {
        let text = format_attributes(&FaceAttributes::unknown());
        assert_eq!(
            text,
            "Gender: -\nAge Range: Unknown\nEmotion: -\nRace: -"
        );
    }

    #[test]
    fn test_format_sort() {
        let sort = ActiveSort {
            column: RecordField::AgeRange,
            ascending: false,
        };
        assert_eq!(format_sort(sort), "Sorted by age_range (descending)");
    }
}
