//! Adapter implementations of the port traits.
//!
//! `live` talks to the real filesystem; `memory` backs unit tests.

pub mod live;
pub mod memory;
