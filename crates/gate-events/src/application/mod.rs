//! # Application Layer
//!
//! The listener registry callers drive.

pub mod registry;

pub use registry::*;
