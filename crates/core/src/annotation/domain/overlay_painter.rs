use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

/// A single mark to draw on a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    /// Outline around a detected face.
    FaceBox(FaceRegion),
    /// Text whose baseline starts at `anchor`.
    Label { anchor: (i32, i32), text: String },
}

/// Domain interface for rendering overlays onto a frame.
///
/// Implementations modify the frame in place. Marks that fall partly or
/// entirely outside the frame are clipped, never rejected.
pub trait OverlayPainter: Send {
    fn paint(&self, frame: &mut Frame, overlays: &[Overlay]);
}
