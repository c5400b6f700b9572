//! Storage implementations of the [`crate::traits::ModelStore`] boundary.

pub mod memory;

pub use memory::MemoryStore;
