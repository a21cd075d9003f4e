use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::shared::frame::Frame;

/// Domain interface for the external face-attribute analyzer.
///
/// Returns zero or more per-face results in the analyzer's own order.
/// Detection is best-effort: results may carry degenerate regions when no
/// face is present. Calls are synchronous and may block.
pub trait FaceAnalyzer: Send {
    fn analyze(&mut self, frame: &Frame) -> Result<Vec<FaceAnalysis>, Box<dyn std::error::Error>>;
}
