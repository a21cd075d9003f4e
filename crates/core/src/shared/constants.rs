pub const DATA_FILE_NAME: &str = "face_data.csv";
pub const IMAGE_DIR_NAME: &str = "captured_faces";

/// Calibration applied to raw age estimates; the analyzer skews high.
pub const AGE_ADJUSTMENT: i64 = -3;

/// Width of one age bucket, in years.
pub const AGE_BUCKET_WIDTH: i64 = 5;

pub const UNKNOWN_AGE: &str = "Unknown";
pub const MISSING_ATTRIBUTE: &str = "-";

/// Target delay between live frames (~50 fps ceiling).
pub const FRAME_INTERVAL_MS: u64 = 20;

pub const DEFAULT_ANALYZER_URL: &str = "http://127.0.0.1:5005";
pub const ANALYZER_ACTIONS: &[&str] = &["gender", "emotion", "age", "race"];

pub const UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const CAPTURE_FILENAME_PREFIX: &str = "face_";
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
