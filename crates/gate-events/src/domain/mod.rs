//! # Domain Module
//!
//! Cursors, checkpointing, and the listener error taxonomy.

pub mod checkpointing;
pub mod cursor;
pub mod errors;

pub use checkpointing::*;
pub use cursor::*;
pub use errors::*;
