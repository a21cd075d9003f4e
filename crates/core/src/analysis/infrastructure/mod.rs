pub mod http_face_analyzer;
