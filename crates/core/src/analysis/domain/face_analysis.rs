use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::domain::age_bucketer::AgeBucketer;
use crate::shared::constants::{MISSING_ATTRIBUTE, UNKNOWN_AGE};
use crate::shared::region::FaceRegion;

/// One per-face result as reported by the analyzer.
///
/// Every attribute is optional: the analyzer may run on a frame without a
/// face, or leave out categories it could not classify.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FaceAnalysis {
    #[serde(default)]
    pub region: Option<FaceRegion>,
    #[serde(default)]
    pub dominant_gender: Option<String>,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub dominant_race: Option<String>,
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<f64>,
}

impl FaceAnalysis {
    /// The face box, only if it has a non-zero area.
    pub fn visible_region(&self) -> Option<FaceRegion> {
        self.region.filter(FaceRegion::is_visible)
    }
}

/// Accepts a number, a numeric string, or anything else (mapped to `None`).
fn lenient_age<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Normalized attributes for one face: every field is present, with
/// sentinels standing in for anything the analyzer left out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceAttributes {
    pub gender: String,
    pub age_range: String,
    pub emotion: String,
    pub race: String,
}

impl FaceAttributes {
    pub fn from_analysis(analysis: &FaceAnalysis, bucketer: &AgeBucketer) -> Self {
        Self {
            gender: label_or_sentinel(analysis.dominant_gender.as_deref()),
            age_range: bucketer.bucket(analysis.age),
            emotion: label_or_sentinel(analysis.dominant_emotion.as_deref()),
            race: label_or_sentinel(analysis.dominant_race.as_deref()),
        }
    }

    /// Attributes of the first result, as used when storing a single image.
    ///
    /// Region size is not checked here; an empty result list yields sentinels.
    pub fn from_first(results: &[FaceAnalysis], bucketer: &AgeBucketer) -> Self {
        results
            .first()
            .map(|first| Self::from_analysis(first, bucketer))
            .unwrap_or_else(Self::unknown)
    }

    /// Attributes for a face the analyzer could not describe at all.
    pub fn unknown() -> Self {
        Self {
            gender: MISSING_ATTRIBUTE.to_string(),
            age_range: UNKNOWN_AGE.to_string(),
            emotion: MISSING_ATTRIBUTE.to_string(),
            race: MISSING_ATTRIBUTE.to_string(),
        }
    }

    /// Display lines in the order an operator reads them.
    pub fn display_lines(&self) -> [String; 4] {
        [
            format!("Gender: {}", self.gender),
            format!("Age Range: {}", self.age_range),
            format!("Emotion: {}", self.emotion),
            format!("Race: {}", self.race),
        ]
    }
}

fn label_or_sentinel(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => MISSING_ATTRIBUTE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_json(json: &str) -> FaceAnalysis {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_result_is_normalized() {
        let analysis = analysis_json(
            r#"{"region": {"x": 1, "y": 2, "w": 30, "h": 40},
                "dominant_gender": "Woman", "dominant_emotion": "happy",
                "dominant_race": "asian", "age": 31}"#,
        );
        let attrs = FaceAttributes::from_analysis(&analysis, &AgeBucketer::default());
        assert_eq!(
            attrs,
            FaceAttributes {
                gender: "Woman".to_string(),
                age_range: "25-30".to_string(),
                emotion: "happy".to_string(),
                race: "asian".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_fields_get_sentinels() {
        let analysis = analysis_json("{}");
        let attrs = FaceAttributes::from_analysis(&analysis, &AgeBucketer::default());
        assert_eq!(attrs, FaceAttributes::unknown());
    }

    #[test]
    fn test_blank_label_is_treated_as_missing() {
        let analysis = analysis_json(r#"{"dominant_gender": "  ", "dominant_race": null}"#);
        let attrs = FaceAttributes::from_analysis(&analysis, &AgeBucketer::default());
        assert_eq!(attrs.gender, "-");
        assert_eq!(attrs.race, "-");
    }

    #[test]
    fn test_age_accepts_numeric_string() {
        assert_eq!(analysis_json(r#"{"age": "42"}"#).age, Some(42.0));
    }

    #[test]
    fn test_non_numeric_age_is_absent() {
        assert_eq!(analysis_json(r#"{"age": "forty"}"#).age, None);
        assert_eq!(analysis_json(r#"{"age": [1]}"#).age, None);
        assert_eq!(analysis_json(r#"{"age": null}"#).age, None);
    }

    #[test]
    fn test_visible_region_filters_degenerate_boxes() {
        let zero = analysis_json(r#"{"region": {"x": 0, "y": 0, "w": 0, "h": 0}}"#);
        assert!(zero.visible_region().is_none());
        let none = analysis_json("{}");
        assert!(none.visible_region().is_none());
        let real = analysis_json(r#"{"region": {"x": 5, "y": 5, "w": 10, "h": 10}}"#);
        assert_eq!(real.visible_region(), Some(FaceRegion::new(5, 5, 10, 10)));
    }

    #[test]
    fn test_extra_analyzer_fields_are_ignored() {
        let analysis = analysis_json(
            r#"{"emotion": {"happy": 0.9}, "face_confidence": 0.93, "dominant_emotion": "happy"}"#,
        );
        assert_eq!(analysis.dominant_emotion.as_deref(), Some("happy"));
    }

    #[test]
    fn test_from_first_uses_first_result_only() {
        let results = vec![
            analysis_json(r#"{"dominant_gender": "Man", "age": 8}"#),
            analysis_json(r#"{"dominant_gender": "Woman"}"#),
        ];
        let attrs = FaceAttributes::from_first(&results, &AgeBucketer::default());
        assert_eq!(attrs.gender, "Man");
        assert_eq!(attrs.age_range, "5-10");
    }

    #[test]
    fn test_from_first_without_results_is_unknown() {
        let attrs = FaceAttributes::from_first(&[], &AgeBucketer::default());
        assert_eq!(attrs, FaceAttributes::unknown());
    }

    #[test]
    fn test_display_lines() {
        let lines = FaceAttributes::unknown().display_lines();
        assert_eq!(lines[0], "Gender: -");
        assert_eq!(lines[1], "Age Range: Unknown");
    }
}
