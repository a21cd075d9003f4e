use std::path::Path;

use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// Decodes an image file into an RGB [`Frame`] with the `image` crate.
pub fn read_frame(path: &Path, index: usize) -> Result<Frame, CaptureError> {
    let image = image::open(path).map_err(|source| CaptureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Frame::from_rgb_image(image.to_rgb8(), index))
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
