pub mod db;
pub mod memory;
pub mod text_provider;

pub use db::DbAdapter;
pub use memory::MemoryStore;
pub use text_provider::HttpTextProvider;
