//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryCollection, InMemoryStore, QueryStats};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresCollection, PostgresSource, ensure_schema};
