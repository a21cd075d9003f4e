use chrono::NaiveDateTime;

use crate::analysis::domain::face_analysis::FaceAttributes;
use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::annotation::domain::frame_annotator::{FrameAnnotator, LiveAnnotation};
use crate::capture::domain::frame_source::FrameSource;
use crate::catalog::domain::face_record::FaceRecord;
use crate::catalog::domain::record_store::RecordStore;
use crate::pipeline::capture_logger::CaptureLogger;
use crate::pipeline::frame_feed::FrameFeed;
use crate::pipeline::session_error::SessionError;
use crate::shared::constants::{CAPTURE_FILENAME_PREFIX, CAPTURE_TIMESTAMP_FORMAT};

/// Live capture loop: pulls frames from a [`FrameFeed`], annotates them, and
/// stores the current frame on request.
///
/// Frames are consumed in order and analyzed one at a time on the caller's
/// thread. Analyzer failures during the loop are logged and skipped; the
/// same failure during `capture_and_store` is returned to the caller.
pub struct CaptureSession {
    annotator: FrameAnnotator,
    analyzer: Box<dyn FaceAnalyzer>,
    logger: Box<dyn CaptureLogger>,
    feed: Option<FrameFeed>,
    last: Option<LiveAnnotation>,
}

impl CaptureSession {
    pub fn new(
        annotator: FrameAnnotator,
        analyzer: Box<dyn FaceAnalyzer>,
        logger: Box<dyn CaptureLogger>,
    ) -> Self {
        Self {
            annotator,
            analyzer,
            logger,
            feed: None,
            last: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.feed.is_some()
    }

    /// Opens `source` and starts reading. Does nothing if already running.
    pub fn start(&mut self, source: Box<dyn FrameSource>) -> Result<(), SessionError> {
        if self.is_active() {
            log::debug!("Capture already running");
            return Ok(());
        }
        self.feed = Some(FrameFeed::start(source)?);
        self.last = None;
        self.logger.info("Capture started");
        Ok(())
    }

    /// Stops reading and releases the device. The last annotated frame is
    /// kept so it can still be stored.
    pub fn stop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.stop();
            self.logger.info("Capture stopped");
            self.logger.summary();
        }
    }

    /// Blocks for the next frame and annotates it.
    ///
    /// Returns `None` when the session is not running. When the device stops
    /// delivering frames, or fails, the session stops itself.
    pub fn next_frame(&mut self) -> Option<&LiveAnnotation> {
        let next = self.feed.as_ref()?.recv();
        match next {
            Some(Ok(frame)) => {
                let live = self.annotator.annotate_live(frame, self.analyzer.as_mut());
                match &live.failure {
                    Some(error) => self.logger.failure(live.frame.index(), error),
                    None => self
                        .logger
                        .frame(live.frame.index(), live.faces.len(), live.analyze_ms),
                }
                self.last = Some(live);
                self.last.as_ref()
            }
            Some(Err(e)) => {
                log::error!("Capture device failed: {e}");
                self.stop();
                None
            }
            None => {
                self.logger.info("Capture source ended");
                self.stop();
                None
            }
        }
    }

    pub fn last_frame(&self) -> Option<&LiveAnnotation> {
        self.last.as_ref()
    }

    /// Analyzes the last annotated frame and stores it as
    /// `face_<timestamp>.jpg` with a record for its first face.
    ///
    /// Nothing is written if analysis fails. If the record cannot be
    /// persisted, the image just written is removed again.
    pub fn capture_and_store(
        &mut self,
        store: &mut RecordStore,
        now: NaiveDateTime,
    ) -> Result<FaceRecord, SessionError> {
        let Some(last) = self.last.as_ref() else {
            return Err(SessionError::NoFrame);
        };

        let results = self
            .analyzer
            .analyze(&last.frame)
            .map_err(|e| SessionError::Analysis(e.to_string()))?;
        let attributes = FaceAttributes::from_first(&results, self.annotator.bucketer());

        let filename = capture_filename(&now);
        store.images().write_frame(&filename, &last.frame)?;

        let record = FaceRecord::new(filename.as_str(), attributes);
        if let Err(e) = store.append(record.clone()) {
            if let Err(cleanup) = store.images().remove(&filename) {
                log::warn!("Could not remove orphaned capture {filename}: {cleanup}");
            }
            return Err(e.into());
        }
        Ok(record)
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Stored name for a frame captured at `now`.
pub fn capture_filename(now: &NaiveDateTime) -> String {
    format!(
        "{CAPTURE_FILENAME_PREFIX}{}.jpg",
        now.format(CAPTURE_TIMESTAMP_FORMAT)
    )
}
