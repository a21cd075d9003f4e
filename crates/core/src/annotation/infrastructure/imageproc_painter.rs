use std::fs;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::Rgb;
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use thiserror::Error;

use crate::annotation::domain::overlay_painter::{Overlay, OverlayPainter};
use crate::shared::config::CatalogConfig;
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

pub const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const BOX_THICKNESS: i32 = 2;
pub const LABEL_SCALE: f32 = 18.0;

/// Farthest a label may start left of or above the canvas and still be drawn.
const LABEL_REACH: i32 = 4096;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a usable TrueType/OpenType font")]
    Invalid { path: String },
}

/// Draws face boxes and labels with `imageproc`.
///
/// Text needs a TrueType font; without one only boxes are drawn.
pub struct ImageprocPainter {
    font: Option<FontVec>,
    scale: PxScale,
}

impl ImageprocPainter {
    pub fn new(font: Option<FontVec>) -> Self {
        Self {
            font,
            scale: PxScale::from(LABEL_SCALE),
        }
    }

    pub fn with_font_file(path: &Path) -> Result<Self, FontError> {
        let bytes = fs::read(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| FontError::Invalid {
            path: path.display().to_string(),
        })?;
        Ok(Self::new(Some(font)))
    }

    /// Uses the configured (or first available system) font, falling back to
    /// box-only rendering when none loads.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let Some(path) = config.resolve_font() else {
            log::info!("No overlay font found; labels will not be drawn");
            return Self::new(None);
        };
        match Self::with_font_file(&path) {
            Ok(painter) => {
                log::debug!("Overlay font: {}", path.display());
                painter
            }
            Err(e) => {
                log::warn!("{e}; labels will not be drawn");
                Self::new(None)
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl OverlayPainter for ImageprocPainter {
    fn paint(&self, frame: &mut Frame, overlays: &[Overlay]) {
        let mut canvas = frame.to_rgb_image();

        for overlay in overlays {
            match overlay {
                Overlay::FaceBox(region) => {
                    for inset in 0..BOX_THICKNESS {
                        if let Some(rect) =
                            inset_rect(region, inset, canvas.width(), canvas.height())
                        {
                            draw_hollow_rect_mut(&mut canvas, rect, OVERLAY_COLOR);
                        }
                    }
                }
                Overlay::Label { anchor, text } => {
                    if let Some(font) = &self.font {
                        // Anchors are baselines; imageproc positions the top edge.
                        let top = anchor.1.saturating_sub(self.scale.y.round() as i32);
                        if !label_reaches_canvas(anchor.0, top, canvas.width(), canvas.height()) {
                            continue;
                        }
                        draw_text_mut(
                            &mut canvas,
                            OVERLAY_COLOR,
                            anchor.0,
                            top,
                            self.scale,
                            font,
                            text,
                        );
                    }
                }
            }
        }

        frame.data_mut().copy_from_slice(canvas.as_raw());
    }
}

/// The box outline `inset` pixels inside `region`, clipped to one pixel
/// beyond the canvas so off-canvas edges stay invisible.
fn inset_rect(region: &FaceRegion, inset: i32, width: u32, height: u32) -> Option<Rect> {
    let inset = i64::from(inset);
    let left = (i64::from(region.x) + inset).max(-1);
    let top = (i64::from(region.y) + inset).max(-1);
    let right = (i64::from(region.x) + i64::from(region.width) - inset).min(i64::from(width) + 1);
    let bottom = (i64::from(region.y) + i64::from(region.height) - inset).min(i64::from(height) + 1);
    if right - left < 1 || bottom - top < 1 {
        return None;
    }
    Some(Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32))
}

fn label_reaches_canvas(x: i32, top: i32, width: u32, height: u32) -> bool {
    let inside = |at: i32, extent: u32| {
        at > -LABEL_REACH && i64::from(at) < i64::from(extent)
    };
    inside(x, width) && inside(top, height)
}
