//! Controller <-> agent JSON wire messages.
//!
//! Both services depend on this crate so the dispatch protocol cannot drift
//! between them. Everything here is plain serde data; no I/O.

pub mod execute;
pub mod fleet;
