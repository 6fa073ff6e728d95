#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryStore, KeyValueStore, ResultRecord, ResultStore, Storage, StorageError, TokenStore,
};
pub use sqlite::{SqliteInitError, SqliteStore};
