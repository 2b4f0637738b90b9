//! # Ports Module
//!
//! Hexagonal architecture ports for checkpoint persistence.

pub mod outbound;

pub use outbound::*;
