// crates/types/src/lib.rs
pub mod job;

pub use job::*;
