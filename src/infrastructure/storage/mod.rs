//! In-memory record store

mod memory;

pub use memory::InMemoryRepositoryProvider;
