pub mod age_bucketer;
pub mod face_analysis;
pub mod face_analyzer;
