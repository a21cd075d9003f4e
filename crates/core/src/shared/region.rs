use serde::{Deserialize, Deserializer, Serialize};

/// Vertical gap between the top of a face box and the baseline of the
/// headline label drawn above it.
pub const LABEL_GAP_ABOVE: i32 = 10;

/// Line pitch for labels stacked below a face box.
pub const LABEL_LINE_PITCH: i32 = 20;

/// Bounding box of a detected face, in pixel coordinates of its frame.
///
/// The analyzer reports `w`/`h`; absent or zero extents mean it ran
/// without finding a face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub x: i32,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub y: i32,
    #[serde(default, rename = "w", deserialize_with = "lenient_coordinate")]
    pub width: i32,
    #[serde(default, rename = "h", deserialize_with = "lenient_coordinate")]
    pub height: i32,
}

impl FaceRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the region encloses any pixels at all.
    pub fn is_visible(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Anchor of the label drawn just above the box.
    pub fn label_above(&self) -> (i32, i32) {
        (self.x, self.y.saturating_sub(LABEL_GAP_ABOVE))
    }

    /// Anchor of the `line`-th label (1-based) stacked below the box.
    pub fn label_below(&self, line: i32) -> (i32, i32) {
        let offset = self.height.saturating_add(LABEL_LINE_PITCH.saturating_mul(line));
        (self.x, self.y.saturating_add(offset))
    }
}

/// Accepts integers and floats (truncated, saturating at the `i32` bounds);
/// anything else reads as zero.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value.as_ref().and_then(serde_json::Value::as_f64) {
        Some(n) if n.is_finite() => n.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32,
        _ => 0,
    })
}
