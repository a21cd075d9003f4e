use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::FrameSource;
use crate::capture::infrastructure::image_file_reader::{has_extension, read_frame};
use crate::shared::constants::FRAME_EXTENSIONS;
use crate::shared::frame::Frame;

/// Plays a directory of still images as a camera feed, in file-name order.
///
/// With an interval set, `read` paces delivery like a live device.
pub struct ImageSequenceSource {
    dir: PathBuf,
    interval: Option<Duration>,
    pending: VecDeque<PathBuf>,
    next_index: usize,
    last_read: Option<Instant>,
    opened: bool,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            interval: None,
            pending: VecDeque::new(),
            next_index: 0,
            last_read: None,
            opened: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            CaptureError::DeviceUnavailable(format!("{}: {e}", dir.display()))
        })?;
        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_extension(path, FRAME_EXTENSIONS))
            .collect();
        frames.sort();
        Ok(frames)
    }

    fn pace(&mut self) {
        if let (Some(interval), Some(last)) = (self.interval, self.last_read) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_read = Some(Instant::now());
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        let frames = Self::list_frames(&self.dir)?;
        if frames.is_empty() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "no frames in {}",
                self.dir.display()
            )));
        }
        log::info!("Opened {} ({} frames)", self.dir.display(), frames.len());
        self.pending = frames.into();
        self.next_index = 0;
        self.last_read = None;
        self.opened = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.opened {
            return Err(CaptureError::Read("source is not open".to_string()));
        }
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        self.pace();
        let frame = read_frame(&path, self.next_index)?;
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        self.pending.clear();
        self.opened = false;
    }
}
