//! Checkpoint Store Adapters
//!
//! Implementations of the `CheckpointStore` trait.

mod file;
mod memory;

pub use file::FileCheckpointStore;
pub use memory::InMemoryCheckpointStore;
