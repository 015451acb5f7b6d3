//! 存储层：SavedPost 模型、PostStore 抽象与三种后端（PostgREST / SQLite / 内存）

pub mod memory;
pub mod model;
pub mod postgrest;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryStore;
pub use model::{sort_newest_first, SavedPost};
pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;
pub use traits::{PostStore, DEFAULT_TABLE};
