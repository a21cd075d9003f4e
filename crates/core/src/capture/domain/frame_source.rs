use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// Domain interface for a capture device delivering frames in order.
pub trait FrameSource: Send {
    /// Acquires the device. Fails with `DeviceUnavailable` if it cannot be used.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Next frame, or `None` once the device stops delivering.
    fn read(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Releases the device. Must be safe to call more than once.
    fn close(&mut self);
}

/// An opened [`FrameSource`] that is closed when the guard drops, on every
/// exit path including unwinding.
pub struct SourceGuard {
    source: Box<dyn FrameSource>,
}

impl SourceGuard {
    pub fn open(mut source: Box<dyn FrameSource>) -> Result<Self, CaptureError> {
        source.open()?;
        Ok(Self { source })
    }

    pub fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        self.source.read()
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        self.source.close();
        log::debug!("Capture device released");
    }
}
