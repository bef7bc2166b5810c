//! Local filesystem operations on build output.
//!
//! Currently this is the post-build sweep that removes artifacts
//! (typically source maps) which must not ship with the deployed bundle.

mod sweep;

pub use sweep::{SweepReport, sweep};
