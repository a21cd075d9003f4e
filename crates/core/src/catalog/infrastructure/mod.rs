pub mod csv_record_file;
pub mod image_directory;
