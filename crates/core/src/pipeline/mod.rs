pub mod analyze_image_use_case;
pub mod capture_logger;
pub mod capture_session;
pub mod catalog_view;
pub mod frame_feed;
pub mod session_error;
