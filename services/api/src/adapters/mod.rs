pub mod credentials;
pub mod db;
pub mod file_storage;
pub mod memory;

pub use credentials::{hash_password, Argon2Verifier};
pub use db::PgContentStore;
pub use file_storage::FileStorage;
pub use memory::MemoryContentStore;
