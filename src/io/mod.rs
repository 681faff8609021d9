//! Output helpers.
//!
//! - per-sample CSV export (`export`)
//! - full-run JSON export (`export`)

pub mod export;

pub use export::*;
