use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::domain::face_analysis::FaceAttributes;
use crate::shared::constants::{MISSING_ATTRIBUTE, UNKNOWN_AGE};

/// One stored face image and its attributes.
///
/// `filename` is the unique key and the image's path relative to the image
/// directory. Field order here is the column order of the catalog file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub filename: String,
    pub gender: String,
    pub age_range: String,
    pub emotion: String,
    pub race: String,
}

impl FaceRecord {
    pub fn new(filename: impl Into<String>, attributes: FaceAttributes) -> Self {
        Self {
            filename: filename.into(),
            gender: attributes.gender,
            age_range: attributes.age_range,
            emotion: attributes.emotion,
            race: attributes.race,
        }
    }

    pub fn attributes(&self) -> FaceAttributes {
        FaceAttributes {
            gender: self.gender.clone(),
            age_range: self.age_range.clone(),
            emotion: self.emotion.clone(),
            race: self.race.clone(),
        }
    }

    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Filename => &self.filename,
            RecordField::Gender => &self.gender,
            RecordField::AgeRange => &self.age_range,
            RecordField::Emotion => &self.emotion,
            RecordField::Race => &self.race,
        }
    }

    /// Replaces blank attribute cells with their sentinels.
    pub fn with_sentinels(mut self) -> Self {
        for (value, sentinel) in [
            (&mut self.gender, MISSING_ATTRIBUTE),
            (&mut self.age_range, UNKNOWN_AGE),
            (&mut self.emotion, MISSING_ATTRIBUTE),
            (&mut self.race, MISSING_ATTRIBUTE),
        ] {
            if value.trim().is_empty() {
                *value = sentinel.to_string();
            }
        }
        self
    }
}

/// The five catalog columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordField {
    Filename,
    Gender,
    AgeRange,
    Emotion,
    Race,
}

impl RecordField {
    pub const ALL: [RecordField; 5] = [
        RecordField::Filename,
        RecordField::Gender,
        RecordField::AgeRange,
        RecordField::Emotion,
        RecordField::Race,
    ];

    /// Column header in the catalog file.
    pub fn column_name(self) -> &'static str {
        match self {
            RecordField::Filename => "filename",
            RecordField::Gender => "gender",
            RecordField::AgeRange => "age_range",
            RecordField::Emotion => "emotion",
            RecordField::Race => "race",
        }
    }

    /// Human-readable heading.
    pub fn title(self) -> &'static str {
        match self {
            RecordField::Filename => "Filename",
            RecordField::Gender => "Gender",
            RecordField::AgeRange => "Age Range",
            RecordField::Emotion => "Emotion",
            RecordField::Race => "Race",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown field '{}' (expected one of: all, filename, gender, age_range, emotion, race)",
            self.0
        )
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for RecordField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RecordField::ALL
            .into_iter()
            .find(|f| f.column_name() == wanted)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Which cells a search term is matched against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchField {
    #[default]
    All,
    Only(RecordField),
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchField::All => f.write_str("all"),
            SearchField::Only(field) => field.fmt(f),
        }
    }
}

impl FromStr for SearchField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SearchField::All)
        } else {
            s.parse().map(SearchField::Only)
        }
    }
}
