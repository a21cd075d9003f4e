pub mod catalog_error;
pub mod face_record;
pub mod image_store;
pub mod query_engine;
pub mod record_repository;
pub mod record_store;
