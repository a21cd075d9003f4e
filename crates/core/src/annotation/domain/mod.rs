pub mod frame_annotator;
pub mod overlay_painter;
