//! # Gate Types Crate
//!
//! This crate contains the domain entities and value objects shared across
//! the LedgerGate event subscription layer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Uniform streams**: The four event payloads share no base type; the
//!   [`Positioned`] trait is their only common surface, so stream plumbing
//!   stays generic over the payload.
//! - **Identity over location**: Checkpoint attribution uses
//!   [`StreamIdentity`] keys, never connection-specific state.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
