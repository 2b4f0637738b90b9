//! # Domain Module
//!
//! Core domain types for checkpointing.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
