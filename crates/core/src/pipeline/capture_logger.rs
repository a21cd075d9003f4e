use std::time::Instant;

/// Cross-cutting observer for live capture sessions.
///
/// Keeps the session loop free of output concerns: the CLI reports to the
/// log, a GUI or test can discard everything.
pub trait CaptureLogger: Send {
    /// One frame went through the analyzer and annotator.
    fn frame(&mut self, index: usize, faces: usize, analyze_ms: f64);

    /// The analyzer failed on a live frame; the frame was shown unannotated.
    fn failure(&mut self, index: usize, error: &str);

    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullCaptureLogger;

impl CaptureLogger for NullCaptureLogger {
    fn frame(&mut self, _index: usize, _faces: usize, _analyze_ms: f64) {}
    fn failure(&mut self, _index: usize, _error: &str) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs throttled progress and a closing summary of analyzer latency,
/// faces seen, and failures.
pub struct StdoutCaptureLogger {
    throttle_frames: usize,
    frames: usize,
    faces: usize,
    failures: usize,
    analyze_total_ms: f64,
    analyze_max_ms: f64,
    start_time: Instant,
}

impl StdoutCaptureLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            frames: 0,
            faces: 0,
            failures: 0,
            analyze_total_ms: 0.0,
            analyze_max_ms: 0.0,
            start_time: Instant::now(),
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Returns the formatted summary, or `None` if no frame was seen.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.failures == 0 {
            return None;
        }
        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Capture summary ({} frames, {:.1}s):",
            self.frames + self.failures,
            elapsed_s
        )];

        if self.frames > 0 {
            let avg = self.analyze_total_ms / self.frames as f64;
            let worst = self.analyze_max_ms;
            lines.push(format!("  analyze: avg {avg:.1}ms  max {worst:.1}ms"));
        }
        lines.push(format!("  faces: {}", self.faces));
        lines.push(format!("  failures: {}", self.failures));

        let frames = self.frames + self.failures;
        if elapsed_s > 0.0 {
            lines.push(format!("  Throughput: {:.1} fps", frames as f64 / elapsed_s));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StdoutCaptureLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl CaptureLogger for StdoutCaptureLogger {
    fn frame(&mut self, index: usize, faces: usize, analyze_ms: f64) {
        self.frames += 1;
        self.faces += faces;
        self.analyze_total_ms += analyze_ms;
        self.analyze_max_ms = self.analyze_max_ms.max(analyze_ms);
        if self.frames % self.throttle_frames == 0 {
            log::info!("Frame {index}: {faces} face(s), analyze {analyze_ms:.1}ms");
        }
    }

    fn failure(&mut self, index: usize, error: &str) {
        self.failures += 1;
        log::warn!("Frame {index} passed through unannotated: {error}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
