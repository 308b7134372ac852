pub mod memory_word_repository;
pub mod pool;
pub mod word_repository;

pub use memory_word_repository::InMemoryWordRepository;
pub use word_repository::{PgWordRepository, WordRepository};
