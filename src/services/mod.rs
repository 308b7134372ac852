pub mod csv_import_service;
pub mod fallback_session_store;
pub mod grading_service;
pub mod memory_session_store;
pub mod pg_session_store;
pub mod session_store;
pub mod user_service;
pub mod word_batch_writer;
pub mod word_practice_service;
pub mod word_service;
