use crate::shared::constants::{AGE_ADJUSTMENT, AGE_BUCKET_WIDTH, UNKNOWN_AGE};

/// Maps a raw age estimate to a five-year band such as `"20-25"`.
///
/// The analyzer's estimate is first truncated to whole years, shifted by a
/// calibration offset, and clamped at zero. Anything that cannot be read as
/// a finite number becomes [`UNKNOWN_AGE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeBucketer {
    adjustment: i64,
}

impl AgeBucketer {
    pub fn new(adjustment: i64) -> Self {
        Self { adjustment }
    }

    pub fn adjustment(&self) -> i64 {
        self.adjustment
    }

    pub fn bucket(&self, raw_age: Option<f64>) -> String {
        match raw_age.and_then(whole_years) {
            Some(age) => {
                let adjusted = age.saturating_add(self.adjustment).max(0);
                let base = adjusted / AGE_BUCKET_WIDTH * AGE_BUCKET_WIDTH;
                match base.checked_add(AGE_BUCKET_WIDTH) {
                    Some(top) => format!("{base}-{top}"),
                    None => UNKNOWN_AGE.to_string(),
                }
            }
            None => UNKNOWN_AGE.to_string(),
        }
    }
}

impl Default for AgeBucketer {
    fn default() -> Self {
        Self::new(AGE_ADJUSTMENT)
    }
}

/// Truncates toward zero; `None` for NaN, infinities and out-of-range values.
fn whole_years(raw: f64) -> Option<i64> {
    if !raw.is_finite() {
        return None;
    }
    let truncated = raw.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Whether `label` is `"Unknown"` or `"{b}-{b+5}"` with `b` a non-negative
/// multiple of five.
pub fn is_valid_age_range(label: &str) -> bool {
    if label == UNKNOWN_AGE {
        return true;
    }
    let Some((lo, hi)) = label.split_once('-') else {
        return false;
    };
    let (Ok(base), Ok(top)) = (lo.parse::<i64>(), hi.parse::<i64>()) else {
        return false;
    };
    // Reject non-canonical spellings such as "05-10" or "+5-10".
    base.to_string() == lo
        && top.to_string() == hi
        && base >= 0
        && base % AGE_BUCKET_WIDTH == 0
        && top == base + AGE_BUCKET_WIDTH
}
