//! In-memory adapters for deterministic tests.

pub mod filesystem;

pub use filesystem::MemoryFileSystem;
