use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::{FrameSource, SourceGuard};
use crate::shared::frame::Frame;

/// Frames buffered between the reader thread and the consumer. One slot
/// keeps the consumer on the freshest frame without reordering.
const DEFAULT_CHANNEL_CAPACITY: usize = 1;

type FrameResult = Result<Frame, CaptureError>;

/// Reads a capture device on a dedicated thread and hands frames, in order,
/// to a single consumer.
///
/// Layout: `reader thread [SourceGuard] → bounded channel → consumer`
///
/// The device is opened on the calling thread so an unavailable device is
/// reported before anything is spawned. It is released by the reader
/// thread on every exit path.
pub struct FrameFeed {
    frames: Option<Receiver<FrameResult>>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameFeed {
    pub fn start(source: Box<dyn FrameSource>) -> Result<Self, CaptureError> {
        Self::with_capacity(source, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(source: Box<dyn FrameSource>, capacity: usize) -> Result<Self, CaptureError> {
        let guard = SourceGuard::open(source)?;
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<FrameResult>(capacity.max(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = spawn_reader(guard, frame_tx, cancelled.clone());

        Ok(Self {
            frames: Some(frame_rx),
            cancelled,
            handle: Some(handle),
        })
    }

    /// Blocks for the next frame. `None` once the device has stopped.
    pub fn recv(&self) -> Option<FrameResult> {
        self.frames.as_ref()?.recv().ok()
    }

    /// Stops the reader and waits for the device to be released.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        // Dropping the receiver unblocks a reader waiting on a full channel.
        self.frames.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Capture reader thread panicked");
            }
        }
    }
}

impl Drop for FrameFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_reader(
    mut guard: SourceGuard,
    frame_tx: crossbeam_channel::Sender<FrameResult>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !cancelled.load(Ordering::Relaxed) {
            match guard.read() {
                Ok(Some(frame)) => {
                    if frame_tx.send(Ok(frame)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = frame_tx.send(Err(e));
                    break;
                }
            }
        }
        drop(guard);
    })
}
