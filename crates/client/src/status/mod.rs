// crates/client/src/status/mod.rs
//! Indexing status controller.
//!
//! Provides:
//! - `StatusHandle`: mounts the poll loop, exposes snapshots, create/cancel actions
//! - `StatusStore`: shared state with a dispose guard
//! - `StatusSnapshot`: what subscribers receive after each change

mod actions;
pub mod controller;
pub mod state;

#[cfg(test)]
pub(crate) mod fake;

pub use controller::{StatusHandle, StatusSettings};
pub use state::{StatusSnapshot, StatusState, StatusStore};
