// Adapters layer: concrete implementations of the domain ports.

pub mod sqlite_store;

pub use sqlite_store::SqliteStore;
