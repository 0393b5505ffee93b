//! Persistence backends for experiments, samples and results.
//!
//! - [`MemoryStore`]: process-local, used by tests and dry runs
//! - [`JsonFileStore`]: one directory tree of JSON documents per data dir

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
