//! # Ports Module
//!
//! Hexagonal architecture ports (outbound connection surface).

pub mod outbound;

pub use outbound::*;
