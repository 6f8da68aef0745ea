//! Port traits defining external boundaries.
//!
//! The only boundary these tools cross is the filesystem holding the
//! artifact root. Implementations live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::FileSystem;
