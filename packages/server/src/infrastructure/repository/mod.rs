//! Repository implementations.
//!
//! - `inmemory`: process-local storage for tests and demos
//! - `sqlite`: the classroom backend's database

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemoryDirectory, InMemoryMessageStore};
pub use sqlite::{SqliteDirectory, SqliteMessageStore};
