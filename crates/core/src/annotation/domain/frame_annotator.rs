use std::time::Instant;

use crate::analysis::domain::age_bucketer::AgeBucketer;
use crate::analysis::domain::face_analysis::{FaceAnalysis, FaceAttributes};
use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::annotation::domain::overlay_painter::{Overlay, OverlayPainter};
use crate::shared::frame::Frame;

/// Result of running the analyzer and annotator over one live frame.
#[derive(Debug)]
pub struct LiveAnnotation {
    pub frame: Frame,
    pub faces: Vec<FaceAttributes>,
    pub analyze_ms: f64,
    /// Set when the analyzer failed and the frame was passed through untouched.
    pub failure: Option<String>,
}

/// Turns raw analyzer results into overlays and normalized attributes.
pub struct FrameAnnotator {
    painter: Box<dyn OverlayPainter>,
    bucketer: AgeBucketer,
}

impl FrameAnnotator {
    pub fn new(painter: Box<dyn OverlayPainter>, bucketer: AgeBucketer) -> Self {
        Self { painter, bucketer }
    }

    pub fn bucketer(&self) -> &AgeBucketer {
        &self.bucketer
    }

    /// Draws every visible face and returns one attribute set per face, in
    /// the analyzer's order.
    ///
    /// Results whose region has zero width or height are skipped. With no
    /// surviving faces the frame is returned untouched.
    pub fn annotate(&self, mut frame: Frame, results: &[FaceAnalysis]) -> (Frame, Vec<FaceAttributes>) {
        let mut overlays = Vec::new();
        let mut faces = Vec::new();

        for result in results {
            let Some(region) = result.visible_region() else {
                continue;
            };
            let attributes = FaceAttributes::from_analysis(result, &self.bucketer);

            overlays.push(Overlay::FaceBox(region));
            overlays.push(Overlay::Label {
                anchor: region.label_above(),
                text: format!("{}, {}", attributes.gender, attributes.age_range),
            });
            overlays.push(Overlay::Label {
                anchor: region.label_below(1),
                text: attributes.emotion.clone(),
            });
            overlays.push(Overlay::Label {
                anchor: region.label_below(2),
                text: attributes.race.clone(),
            });
            faces.push(attributes);
        }

        if !overlays.is_empty() {
            self.painter.paint(&mut frame, &overlays);
        }
        (frame, faces)
    }

    /// Analyzes and annotates a frame from a continuous feed.
    ///
    /// Analyzer failures are logged and the frame passes through unmodified
    /// with no faces, so a transient glitch never stops the feed.
    pub fn annotate_live(&self, frame: Frame, analyzer: &mut dyn FaceAnalyzer) -> LiveAnnotation {
        let start = Instant::now();
        let outcome = analyzer.analyze(&frame);
        let analyze_ms = start.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(results) => {
                let (frame, faces) = self.annotate(frame, &results);
                LiveAnnotation {
                    frame,
                    faces,
                    analyze_ms,
                    failure: None,
                }
            }
            Err(e) => {
                log::warn!("Frame processing error on frame {}: {e}", frame.index());
                LiveAnnotation {
                    frame,
                    faces: Vec::new(),
                    analyze_ms,
                    failure: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::infrastructure::imageproc_painter::ImageprocPainter;
    use crate::shared::region::FaceRegion;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct RecordingPainter {
        calls: Arc<Mutex<Vec<Vec<Overlay>>>>,
    }

    impl OverlayPainter for RecordingPainter {
        fn paint(&self, frame: &mut Frame, overlays: &[Overlay]) {
            // Mark the frame so tests can tell it was touched.
            frame.data_mut()[0] = 255;
            self.calls.lock().unwrap().push(overlays.to_vec());
        }
    }

    struct StubAnalyzer {
        outcome: Result<Vec<FaceAnalysis>, String>,
    }

    impl FaceAnalyzer for StubAnalyzer {
        fn analyze(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<FaceAnalysis>, Box<dyn std::error::Error>> {
            self.outcome.clone().map_err(|e| e.into())
        }
    }

    // --- Helpers ---

    fn annotator() -> (FrameAnnotator, Arc<Mutex<Vec<Vec<Overlay>>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let painter = RecordingPainter {
            calls: calls.clone(),
        };
        (FrameAnnotator::new(Box::new(painter), AgeBucketer::default()), calls)
    }

    fn frame() -> Frame {
        Frame::filled(64, 48, [0, 0, 0], 3)
    }

    fn face(x: i32, y: i32, w: i32, h: i32, gender: &str, age: f64) -> FaceAnalysis {
        FaceAnalysis {
            region: Some(FaceRegion::new(x, y, w, h)),
            dominant_gender: Some(gender.to_string()),
            dominant_emotion: Some("happy".to_string()),
            dominant_race: Some("asian".to_string()),
            age: Some(age),
        }
    }

    // --- Tests ---

    #[test]
    fn test_no_results_returns_frame_unmodified() {
        let (annotator, calls) = annotator();
        let original = frame();
        let (out, faces) = annotator.annotate(original.clone(), &[]);
        assert_eq!(out, original);
        assert!(faces.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_area_region_is_skipped() {
        let (annotator, calls) = annotator();
        let original = frame();
        let results = vec![face(0, 0, 0, 0, "Man", 30.0)];
        let (out, faces) = annotator.annotate(original.clone(), &results);
        assert_eq!(out, original);
        assert!(faces.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_region_is_skipped() {
        let (annotator, _) = annotator();
        let results = vec![FaceAnalysis::default()];
        let (_, faces) = annotator.annotate(frame(), &results);
        assert!(faces.is_empty());
    }

    #[test]
    fn test_single_face_overlays() {
        let (annotator, calls) = annotator();
        let results = vec![face(10, 12, 20, 24, "Woman", 23.0)];
        let (out, faces) = annotator.annotate(frame(), &results);

        assert_eq!(out.data()[0], 255);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].gender, "Woman");
        assert_eq!(faces[0].age_range, "20-25");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                Overlay::FaceBox(FaceRegion::new(10, 12, 20, 24)),
                Overlay::Label {
                    anchor: (10, 2),
                    text: "Woman, 20-25".to_string()
                },
                Overlay::Label {
                    anchor: (10, 56),
                    text: "happy".to_string()
                },
                Overlay::Label {
                    anchor: (10, 76),
                    text: "asian".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_multiple_faces_keep_analyzer_order() {
        let (annotator, calls) = annotator();
        let results = vec![
            face(0, 0, 10, 10, "Man", 50.0),
            face(0, 0, 0, 10, "Ghost", 1.0),
            face(30, 0, 10, 10, "Woman", 8.0),
        ];
        let (_, faces) = annotator.annotate(frame(), &results);

        let genders: Vec<_> = faces.iter().map(|f| f.gender.as_str()).collect();
        assert_eq!(genders, ["Man", "Woman"]);
        assert_eq!(faces[1].age_range, "5-10");
        // Painted once per frame, four marks per surviving face.
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 8);
    }

    #[test]
    fn test_region_near_coordinate_limit_is_annotated() {
        let (annotator, calls) = annotator();
        let results = vec![face(0, i32::MAX - 8, 10, 10, "Man", 30.0)];
        let (_, faces) = annotator.annotate(frame(), &results);

        assert_eq!(faces.len(), 1);
        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0][3],
            Overlay::Label {
                anchor: (0, i32::MAX),
                text: "asian".to_string()
            }
        );
    }

    #[test]
    fn test_region_near_coordinate_limit_paints_without_panicking() {
        let annotator = FrameAnnotator::new(
            Box::new(ImageprocPainter::new(None)),
            AgeBucketer::default(),
        );
        let original = frame();
        let results = vec![
            face(0, i32::MAX - 8, 10, 10, "Man", 30.0),
            face(i32::MAX - 1, i32::MIN, i32::MAX, 10, "Woman", 30.0),
        ];
        let (out, faces) = annotator.annotate(original.clone(), &results);
        assert_eq!(faces.len(), 2);
        assert_eq!(out, original);
    }

    #[test]
    fn test_missing_attributes_use_sentinels() {
        let (annotator, _) = annotator();
        let results = vec![FaceAnalysis {
            region: Some(FaceRegion::new(1, 1, 5, 5)),
            ..FaceAnalysis::default()
        }];
        let (_, faces) = annotator.annotate(frame(), &results);
        assert_eq!(faces, vec![FaceAttributes::unknown()]);
    }

    #[test]
    fn test_live_failure_passes_frame_through() {
        let (annotator, calls) = annotator();
        let mut analyzer = StubAnalyzer {
            outcome: Err("model crashed".to_string()),
        };
        let original = frame();
        let live = annotator.annotate_live(original.clone(), &mut analyzer);

        assert_eq!(live.frame, original);
        assert!(live.faces.is_empty());
        assert_eq!(live.failure.as_deref(), Some("model crashed"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_live_success_annotates() {
        let (annotator, _) = annotator();
        let mut analyzer = StubAnalyzer {
            outcome: Ok(vec![face(5, 5, 10, 10, "Man", 40.0)]),
        };
        let live = annotator.annotate_live(frame(), &mut analyzer);

        assert!(live.failure.is_none());
        assert_eq!(live.faces.len(), 1);
        assert_eq!(live.frame.index(), 3);
        assert!(live.analyze_ms >= 0.0);
    }
}
