// crates/core/src/lib.rs
pub mod presenter;
pub mod selector;

pub use presenter::*;
pub use selector::*;
