//! Command handlers.
//!
//! Each handler returns the complete stdout text so nothing is printed until
//! the whole result exists.

pub mod check;
pub mod extract;
