#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Re-exported so the server can name domain types as
// `roster_tonic_core::roster`.
pub use roster;
